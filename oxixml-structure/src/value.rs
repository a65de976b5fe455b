//! Typed value payloads.
//!
//! Every attribute value and node value in the token stream is preceded by a
//! one-byte type tag. Numeric values carry their number inline; anything else
//! carries only its byte length, and the text itself lives in the matching
//! value stream.
//!
//! | Tag | Type  | Payload (big-endian)   |
//! |-----|-------|------------------------|
//! | 0   | Char  | 1 byte, `i8`           |
//! | 1   | Short | 2 bytes, `i16`         |
//! | 2   | Int   | 4 bytes, `i32`         |
//! | 3   | Float | 4 bytes, `f32` bits    |
//! | 4   | Str   | 4 bytes, text length   |
//!
//! A number is only tagged as numeric when formatting it gives back exactly
//! the original text, so `"042"`, `"1.50"` or `"+5"` stay strings.

use oxixml_core::cursor::ByteCursor;
use oxixml_core::error::{OxiXmlError, Result};
use oxixml_core::width::{
    decode_f32, decode_i16, decode_i32, encode_f32, encode_i16, encode_i32, encode_u32,
};
use std::borrow::Cow;
use std::fmt;

/// Integral values with more digits than this may use the 4-byte form.
const SHORT_DIGIT_LIMIT: usize = 5;

/// One-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Signed 8-bit integer.
    Char = 0,
    /// Signed 16-bit integer.
    Short = 1,
    /// Signed 32-bit integer.
    Int = 2,
    /// 32-bit float.
    Float = 3,
    /// Text stored in the value stream.
    Str = 4,
}

impl TypeTag {
    /// Parse a tag byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Char),
            1 => Some(Self::Short),
            2 => Some(Self::Int),
            3 => Some(Self::Float),
            4 => Some(Self::Str),
            _ => None,
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        }
    }
}

/// A classified value as it appears in the token stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    /// Fits in one signed byte.
    Char(i8),
    /// Fits in two signed bytes.
    Short(i16),
    /// Integral with more than five digits.
    Int(i32),
    /// Non-integral number.
    Float(f32),
    /// Text of the given byte length.
    Str(u32),
}

impl TypedValue {
    /// Classify raw value text.
    pub fn classify(text: &[u8]) -> Self {
        let fallback = Self::Str(text.len() as u32);

        let Ok(text) = std::str::from_utf8(text) else {
            return fallback;
        };
        let Ok(number) = text.parse::<f32>() else {
            return fallback;
        };
        if !number.is_finite() {
            return fallback;
        }

        let candidate = if number.ceil() == number {
            Self::integral(number, text)
        } else {
            Some(Self::Float(number))
        };

        match candidate {
            Some(value) if value.format_number().as_deref() == Some(text) => value,
            _ => fallback,
        }
    }

    fn integral(number: f32, text: &str) -> Option<Self> {
        let value = number as i64;
        if let Ok(v) = i8::try_from(value) {
            return Some(Self::Char(v));
        }
        if let Ok(v) = i16::try_from(value) {
            return Some(Self::Short(v));
        }
        let digits = text.bytes().filter(u8::is_ascii_digit).count();
        if digits > SHORT_DIGIT_LIMIT {
            i32::try_from(value).ok().map(Self::Int)
        } else {
            None
        }
    }

    /// Type tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Char(_) => TypeTag::Char,
            Self::Short(_) => TypeTag::Short,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Str(_) => TypeTag::Str,
        }
    }

    /// Decimal text of a numeric value, `None` for strings.
    pub fn format_number(&self) -> Option<String> {
        match self {
            Self::Char(v) => Some(v.to_string()),
            Self::Short(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Str(_) => None,
        }
    }

    /// Append tag and payload.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.tag() as u8);
        match *self {
            Self::Char(v) => out.push(v as u8),
            Self::Short(v) => out.extend_from_slice(&encode_i16(v)),
            Self::Int(v) => out.extend_from_slice(&encode_i32(v)),
            Self::Float(v) => out.extend_from_slice(&encode_f32(v)),
            Self::Str(len) => out.extend_from_slice(&encode_u32(len)),
        }
    }

    /// Read tag and payload.
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let tag = cursor.read_u8()?;
        let tag = TypeTag::from_u8(tag)
            .ok_or_else(|| OxiXmlError::corrupted(offset, format!("unknown type tag {tag}")))?;

        Ok(match tag {
            TypeTag::Char => Self::Char(cursor.read_u8()? as i8),
            TypeTag::Short => Self::Short(decode_i16(cursor.read_array()?)),
            TypeTag::Int => Self::Int(decode_i32(cursor.read_array()?)),
            TypeTag::Float => Self::Float(decode_f32(cursor.read_array()?)),
            TypeTag::Str => Self::Str(cursor.read_u32_be()?),
        })
    }

    /// Produce the value text, advancing `values` past its stored copy.
    ///
    /// Numeric values are rebuilt from their payload; the stream copy must
    /// match byte for byte.
    pub fn materialize<'a>(&self, values: &mut ByteCursor<'a>) -> Result<Cow<'a, [u8]>> {
        let offset = values.position();
        if let Self::Str(len) = *self {
            return Ok(Cow::Borrowed(values.read_slice(len as usize)?));
        }
        match self.format_number() {
            None => Ok(Cow::Borrowed(&[])),
            Some(text) => {
                let stored = values.read_slice(text.len())?;
                if stored != text.as_bytes() {
                    return Err(OxiXmlError::corrupted(
                        offset,
                        format!("value stream disagrees with numeric value {text}"),
                    ));
                }
                Ok(Cow::Owned(text.into_bytes()))
            }
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(len) => write!(f, "{}:{}", self.tag().name(), len),
            _ => write!(
                f,
                "{}:{}",
                self.tag().name(),
                self.format_number().unwrap_or_default()
            ),
        }
    }
}
