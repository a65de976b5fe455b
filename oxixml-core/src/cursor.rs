//! Bounds-checked reading over an in-memory byte slice.
//!
//! Every stream of the container is fully materialized before it is read, so
//! a position-tracking slice reader is all the decoders need. Reads past the
//! end surface as [`OxiXmlError::UnexpectedEof`] carrying the offset.

use crate::error::{OxiXmlError, Result};

/// A forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor starting at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| OxiXmlError::unexpected_eof(self.pos, 1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read exactly `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| OxiXmlError::unexpected_eof(self.pos, len))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    /// Read a big-endian `u16`.
    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x0203);
        assert_eq!(cursor.read_u32_be().unwrap(), 0x0405_0607);
        assert!(cursor.is_empty());
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xAA, 0xBB];
        let mut cursor = ByteCursor::at(&data, 1);

        let err = cursor.read_u16_be().unwrap_err();
        assert!(matches!(
            err,
            OxiXmlError::UnexpectedEof {
                offset: 1,
                expected: 2
            }
        ));
        // A failed read does not move the cursor
        assert_eq!(cursor.peek_u8(), Some(0xBB));
    }

    #[test]
    fn test_read_slice() {
        let data = b"hello world";
        let mut cursor = ByteCursor::new(data);
        assert_eq!(cursor.read_slice(5).unwrap(), b"hello");
        assert_eq!(cursor.remaining(), 6);
        assert!(cursor.read_slice(7).is_err());
        assert_eq!(cursor.read_slice(6).unwrap(), b" world");
    }
}
