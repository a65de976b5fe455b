//! Fixed-width id and scalar encoding.
//!
//! Every name id of one document is written with the same width, picked once
//! per dictionary from its cardinality. The top few values of the 1-byte and
//! 2-byte spaces are never handed out as ids; the very top value of each
//! width marks a nameless text node.
//!
//! All multi-byte integers are big-endian.

use crate::cursor::ByteCursor;
use crate::error::{OxiXmlError, Result};

/// Largest dictionary that still fits 1-byte ids.
pub const ONE_BYTE_LIMIT: usize = 253;

/// Largest dictionary that still fits 2-byte ids.
pub const TWO_BYTE_LIMIT: usize = 65533;

/// Byte width used for the ids of one dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdWidth {
    /// 1-byte ids (up to 253 names).
    One,
    /// 2-byte ids (up to 65533 names).
    Two,
    /// 4-byte ids.
    Four,
}

impl IdWidth {
    /// Pick the narrowest width for a dictionary of `count` distinct names.
    pub fn for_count(count: usize) -> Self {
        if count <= ONE_BYTE_LIMIT {
            Self::One
        } else if count <= TWO_BYTE_LIMIT {
            Self::Two
        } else {
            Self::Four
        }
    }

    /// Number of bytes per id.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Header byte recording this width.
    pub fn selector(self) -> u8 {
        self.size() as u8
    }

    /// Parse a header byte.
    pub fn from_selector(selector: u8) -> Result<Self> {
        match selector {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(OxiXmlError::invalid_header(format!(
                "unknown id width selector {other}"
            ))),
        }
    }

    /// The reserved id of a nameless (text) node.
    pub fn null_id(self) -> u32 {
        match self {
            Self::One => u8::MAX as u32,
            Self::Two => u16::MAX as u32,
            Self::Four => u32::MAX,
        }
    }

    /// Append `id` using this width.
    ///
    /// The caller guarantees the id fits; dictionaries only produce ids below
    /// the limit that selected the width.
    pub fn write_id(self, out: &mut Vec<u8>, id: u32) {
        debug_assert!(id <= self.null_id());
        match self {
            Self::One => out.push(id as u8),
            Self::Two => out.extend_from_slice(&encode_u16(id as u16)),
            Self::Four => out.extend_from_slice(&encode_u32(id)),
        }
    }

    /// Read one id of this width.
    pub fn read_id(self, cursor: &mut ByteCursor<'_>) -> Result<u32> {
        match self {
            Self::One => cursor.read_u8().map(u32::from),
            Self::Two => cursor.read_u16_be().map(u32::from),
            Self::Four => cursor.read_u32_be(),
        }
    }
}

/// Encode a `u16` big-endian.
#[inline]
pub fn encode_u16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Decode a big-endian `u16`.
#[inline]
pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Encode an `i16` big-endian.
#[inline]
pub fn encode_i16(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Decode a big-endian `i16`.
#[inline]
pub fn decode_i16(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// Encode a `u32` big-endian.
#[inline]
pub fn encode_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Encode an `i32` big-endian.
#[inline]
pub fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a big-endian `i32`.
#[inline]
pub fn decode_i32(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Encode an `f32` as its big-endian IEEE-754 bits.
#[inline]
pub fn encode_f32(value: f32) -> [u8; 4] {
    value.to_bits().to_be_bytes()
}

/// Decode big-endian IEEE-754 bits into an `f32`.
#[inline]
pub fn decode_f32(bytes: [u8; 4]) -> f32 {
    f32::from_bits(u32::from_be_bytes(bytes))
}
