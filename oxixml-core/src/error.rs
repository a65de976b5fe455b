//! Error types for OxiXml operations.
//!
//! The compressed format is an internal-consistency format: it is not designed
//! to survive adversarial input. Wherever a desynchronization can be detected
//! for free (an unknown marker, an id outside a dictionary, a truncated
//! section) it is reported through [`OxiXmlError`] instead of reading past the
//! end of a buffer.

use std::io;
use thiserror::Error;

/// The main error type for OxiXml operations.
#[derive(Debug, Error)]
pub enum OxiXmlError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input text is not in a 1-byte-per-character encoding.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Description of the encoding problem.
        message: String,
    },

    /// Invalid container header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of a buffer.
    #[error("Unexpected end of data at offset {offset}: expected {expected} more bytes")]
    UnexpectedEof {
        /// Byte offset where the read was attempted.
        offset: usize,
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Corrupted data in a stream.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },

    /// An id that has no entry in its dictionary.
    #[error("Unknown {kind} id: {id}")]
    UnknownId {
        /// Which dictionary was consulted.
        kind: &'static str,
        /// The id that was not found.
        id: u32,
    },

    /// A name with no id in its dictionary.
    #[error("Unknown {kind}: {name:?}")]
    UnknownName {
        /// Which dictionary was consulted.
        kind: &'static str,
        /// The name that was not found, lossily decoded.
        name: String,
    },
}

/// Result type alias for OxiXml operations.
pub type Result<T> = std::result::Result<T, OxiXmlError>;

impl OxiXmlError {
    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(offset: usize, expected: usize) -> Self {
        Self::UnexpectedEof { offset, expected }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: usize, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unknown id error.
    pub fn unknown_id(kind: &'static str, id: u32) -> Self {
        Self::UnknownId { kind, id }
    }

    /// Create an unknown name error.
    pub fn unknown_name(kind: &'static str, name: &[u8]) -> Self {
        Self::UnknownName {
            kind,
            name: String::from_utf8_lossy(name).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiXmlError::encoding("UTF-16LE byte order mark");
        assert!(err.to_string().contains("UTF-16LE"));

        let err = OxiXmlError::unexpected_eof(12, 4);
        assert!(err.to_string().contains("offset 12"));

        let err = OxiXmlError::unknown_id("markup name", 7);
        assert_eq!(err.to_string(), "Unknown markup name id: 7");

        let err = OxiXmlError::unknown_name("attribute name", b"href");
        assert_eq!(err.to_string(), "Unknown attribute name: \"href\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: OxiXmlError = io_err.into();
        assert!(matches!(err, OxiXmlError::Io(_)));
    }
}
