//! # OxiXml LZRC
//!
//! LZ77 dictionary compression with adaptive range coding.
//!
//! Every stream is coded independently: a sliding-window match finder turns the
//! input into literal and match tokens, and each token field goes through its
//! own adaptive frequency model into a range coder.
//!
//! ## Usage
//!
//! ```rust
//! use oxixml_lzrc::{LzConfig, compress, decompress};
//!
//! let data = b"<item/><item/><item/>";
//! let compressed = compress(data, &LzConfig::DEFAULT);
//! assert_eq!(decompress(&compressed).unwrap(), data);
//! ```
//!
//! ## Stream Format
//!
//! A stream is a sequence of range-coded tokens, ended by an explicit flag:
//! 1. Flag (`0` match, `1` literal, `2` end of stream)
//! 2. Literal: one byte from the literal model
//! 3. Match: offset symbol (`<= 250` direct, `251` + 15 raw bits of
//!    `offset - 251`), then the length from the model selected by
//!    `ceil_log2(offset)`
//!
//! Streams are self-terminating, so several can be concatenated and split
//! again with [`decompress_at`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod model;
pub mod range_coder;

// Re-exports
pub use config::LzConfig;
pub use decoder::LzDecoder;
pub use encoder::{LzEncoder, LzToken, MatchFinder};
pub use model::{FrequencyModel, LzModels};
pub use range_coder::{RangeDecoder, RangeEncoder};

use oxixml_core::error::Result;

/// Number of raw bits carrying a long offset.
pub const MAX_OFFSET_BITS: u32 = 15;

/// Matches must start strictly less than this many bytes back.
pub const MAX_OFFSET: usize = 1 << MAX_OFFSET_BITS;

/// Match lengths stay strictly below this.
pub const MAX_LENGTH: usize = 256;

/// Shortest match that is ever coded.
pub const MIN_LENGTH: usize = 3;

/// Largest offset coded directly in the offset alphabet.
pub const MAX_LITTLE_OFFSET: usize = 250;

/// Offset symbol announcing a raw 15-bit offset.
pub const LONG_OFFSET_SYMBOL: usize = 251;

/// Flag symbol for a match.
pub const FLAG_MATCH: usize = 0;

/// Flag symbol for a literal.
pub const FLAG_LITERAL: usize = 1;

/// Flag symbol ending a stream.
pub const FLAG_END_OF_STREAM: usize = 2;

/// Compress `data` into one self-terminating stream.
pub fn compress(data: &[u8], config: &LzConfig) -> Vec<u8> {
    LzEncoder::new(*config).compress(data)
}

/// Decompress a stream that fills `data` from the start.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_at(data, 0).map(|(out, _)| out)
}

/// Decompress the stream starting at `cursor`.
///
/// Returns the decoded bytes and the position just past the stream, which is
/// where the next concatenated stream starts.
pub fn decompress_at(source: &[u8], cursor: usize) -> Result<(Vec<u8>, usize)> {
    LzDecoder::new(source, cursor)?.decompress()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress_empty() {
        let compressed = compress(b"", &LzConfig::DEFAULT);
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_compress_decompress_single_byte() {
        let compressed = compress(b"A", &LzConfig::DEFAULT);
        assert_eq!(decompress(&compressed).unwrap(), b"A");
    }

    #[test]
    fn test_compress_decompress_roundtrip() {
        let original = b"Hello, XML World! <a><b>hello</b><b>world</b></a> Hello again.";
        let compressed = compress(original, &LzConfig::DEFAULT);
        assert_eq!(decompress(&compressed).unwrap(), original);
    }

    #[test]
    fn test_compress_decompress_repeated() {
        let original = vec![b'A'; 1000];
        let compressed = compress(&original, &LzConfig::DEFAULT);
        assert_eq!(decompress(&compressed).unwrap(), original);
        assert!(compressed.len() < 100);
    }

    #[test]
    fn test_compression_levels() {
        let data = b"Hello World! This is a test of LZ compression with various levels.".repeat(4);

        for level in 0..=9 {
            let compressed = compress(&data, &LzConfig::from_level(level));
            let decompressed = decompress(&compressed).unwrap();
            assert_eq!(decompressed, data, "Level {} roundtrip failed", level);
        }
    }

    #[test]
    fn test_concatenated_streams() {
        let parts: [&[u8]; 4] = [b"first stream", b"", b"third third third", b"x"];

        let mut file = Vec::new();
        for part in parts {
            file.extend_from_slice(&compress(part, &LzConfig::DEFAULT));
        }

        let mut cursor = 0;
        for part in parts {
            let (out, next) = decompress_at(&file, cursor).unwrap();
            assert_eq!(out, part);
            cursor = next;
        }
        assert_eq!(cursor, file.len());
    }

    #[test]
    fn test_truncated_stream_fails() {
        let compressed = compress(b"some data that is long enough to matter", &LzConfig::DEFAULT);
        let truncated = &compressed[..compressed.len() - 3];
        assert!(decompress(truncated).is_err());
    }
}
