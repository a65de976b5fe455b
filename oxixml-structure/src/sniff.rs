//! Input encoding detection.
//!
//! Names and values are handled as raw UTF-8 bytes, so input in any other
//! encoding is rejected up front instead of being compressed into garbage.

use encoding_rs::{Encoding, UTF_8};
use oxixml_core::error::{OxiXmlError, Result};

/// Byte-order-mark classification of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    /// No byte order mark.
    Plain,
    /// UTF-8 with a leading byte order mark of the given length.
    Utf8Bom(usize),
    /// Another encoding announced by its byte order mark.
    Other(&'static Encoding),
}

impl InputEncoding {
    /// Detect from the first bytes of the input.
    pub fn from_bom(input: &[u8]) -> Self {
        match Encoding::for_bom(input) {
            Some((encoding, len)) if encoding == UTF_8 => Self::Utf8Bom(len),
            Some((encoding, _)) => Self::Other(encoding),
            None => Self::Plain,
        }
    }
}

/// Validate `input` and return the document bytes without any UTF-8 BOM.
pub fn check_encoding(input: &[u8]) -> Result<&[u8]> {
    let body = match InputEncoding::from_bom(input) {
        InputEncoding::Plain => input,
        InputEncoding::Utf8Bom(len) => &input[len..],
        InputEncoding::Other(encoding) => {
            return Err(OxiXmlError::encoding(format!(
                "{} input is not supported, convert to UTF-8 first",
                encoding.name()
            )));
        }
    };

    if let Some(pos) = body.iter().position(|&b| b == 0) {
        return Err(OxiXmlError::encoding(format!(
            "NUL byte at offset {pos}, input is not UTF-8 text"
        )));
    }

    Ok(body)
}
