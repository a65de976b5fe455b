//! Range coder over cumulative-frequency models.
//!
//! This is the LZMA carry-propagating range coder (32-bit range, 64-bit low
//! with a cache byte) generalized from binary probabilities to arbitrary
//! cumulative frequencies:
//! - 32-bit range tracking
//! - Normalization while range drops below 2^24
//! - Frequency totals up to [`MAX_TOTAL`]
//!
//! The encoder emits one byte per normalization step plus five on flush; the
//! decoder reads five bytes up front and one per normalization step, so after
//! the final symbol it has consumed exactly what the encoder produced. That
//! property is what lets independently coded sections sit back to back.

use crate::model::FrequencyModel;
use oxixml_core::error::{OxiXmlError, Result};

/// Top value for range normalization.
const TOP_VALUE: u32 = 1 << 24;

/// Largest frequency total a model may reach.
///
/// Keeps `range / total` at 8 bits or more after normalization.
pub const MAX_TOTAL: u32 = 1 << 16;

/// Range encoder.
#[derive(Debug)]
pub struct RangeEncoder {
    /// Output buffer.
    buffer: Vec<u8>,
    /// Current range.
    range: u32,
    /// Low value.
    low: u64,
    /// Cache byte.
    cache: u8,
    /// Cache size.
    cache_size: u64,
}

impl RangeEncoder {
    /// Create a new range encoder.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            range: 0xFFFF_FFFF,
            low: 0,
            cache: 0,
            cache_size: 1,
        }
    }

    /// Shift low and write bytes.
    ///
    /// Bits 32-39 of `low` hold a pending carry that ripples into the cached
    /// byte and the run of `0xFF` bytes behind it.
    fn shift_low(&mut self) {
        if self.low < 0xFF00_0000 || self.low > 0xFFFF_FFFF {
            let mut tmp = self.cache;
            let carry = (self.low >> 32) as u8;

            loop {
                self.buffer.push(tmp.wrapping_add(carry));
                tmp = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }

            self.cache = (self.low >> 24) as u8;
        }

        self.cache_size += 1;
        self.low = (self.low << 8) & 0xFFFF_FFFF;
    }

    /// Normalize the range.
    fn normalize(&mut self) {
        while self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low();
        }
    }

    /// Encode the interval `[cum, cum + freq)` out of `total`.
    pub fn encode(&mut self, cum: u32, freq: u32, total: u32) {
        debug_assert!(freq > 0 && cum + freq <= total && total <= MAX_TOTAL);
        let step = self.range / total;
        self.low += step as u64 * cum as u64;
        self.range = step * freq;
        self.normalize();
    }

    /// Encode `symbol` with `model`, then adapt the model.
    pub fn encode_symbol(&mut self, model: &mut FrequencyModel, symbol: usize) {
        let (cum, freq) = model.range_of(symbol);
        self.encode(cum, freq, model.total());
        model.update(symbol);
    }

    /// Encode a bit with fixed 50% probability.
    pub fn encode_direct_bit(&mut self, bit: u32) {
        self.range >>= 1;
        if bit != 0 {
            self.low += self.range as u64;
        }
        self.normalize();
    }

    /// Encode the low `count` bits of `value`, most significant first.
    pub fn encode_direct_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.encode_direct_bit((value >> i) & 1);
        }
    }

    /// Flush the encoder.
    pub fn flush(&mut self) {
        for _ in 0..5 {
            self.shift_low();
        }
    }

    /// Get the encoded data.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Range decoder reading from a slice.
#[derive(Debug)]
pub struct RangeDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    range: u32,
    code: u32,
    /// `range / total` from the last [`RangeDecoder::decode_freq`].
    step: u32,
}

impl<'a> RangeDecoder<'a> {
    /// Start decoding a stream that begins at `start`.
    pub fn new(data: &'a [u8], start: usize) -> Result<Self> {
        let mut decoder = Self {
            data,
            pos: start,
            range: 0xFFFF_FFFF,
            code: 0,
            step: 1,
        };

        // The encoder's first byte is its initial (empty) cache
        if decoder.next_byte()? != 0x00 {
            return Err(OxiXmlError::corrupted(start, "invalid range coder start byte"));
        }
        for _ in 0..4 {
            decoder.code = (decoder.code << 8) | decoder.next_byte()? as u32;
        }

        Ok(decoder)
    }

    /// Position just past the last byte consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| OxiXmlError::unexpected_eof(self.pos, 1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Normalize the range (refill when range gets small).
    fn normalize(&mut self) -> Result<()> {
        while self.range < TOP_VALUE {
            self.range <<= 8;
            self.code = (self.code << 8) | self.next_byte()? as u32;
        }
        Ok(())
    }

    /// Cumulative frequency the next symbol falls into.
    ///
    /// Must be followed by [`RangeDecoder::decode_update`] with the same
    /// `total`.
    pub fn decode_freq(&mut self, total: u32) -> u32 {
        self.step = self.range / total;
        (self.code / self.step).min(total - 1)
    }

    /// Remove the decoded interval `[cum, cum + freq)` from the state.
    pub fn decode_update(&mut self, cum: u32, freq: u32) -> Result<()> {
        self.code -= self.step * cum;
        self.range = self.step * freq;
        self.normalize()
    }

    /// Decode one symbol with `model`, then adapt the model.
    pub fn decode_symbol(&mut self, model: &mut FrequencyModel) -> Result<usize> {
        let target = self.decode_freq(model.total());
        let (symbol, cum, freq) = model.find(target);
        self.decode_update(cum, freq)?;
        model.update(symbol);
        Ok(symbol)
    }

    /// Decode a bit with fixed 50% probability.
    pub fn decode_direct_bit(&mut self) -> Result<u32> {
        self.range >>= 1;
        let bit = if self.code >= self.range {
            self.code -= self.range;
            1
        } else {
            0
        };
        self.normalize()?;
        Ok(bit)
    }

    /// Decode `count` bits, most significant first.
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            result = (result << 1) | self.decode_direct_bit()?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_encoder_basic() {
        let encoder = RangeEncoder::new();
        assert_eq!(encoder.range, 0xFFFF_FFFF);
        assert_eq!(encoder.finish().len(), 5);
    }

    #[test]
    fn test_encode_decode_symbols() {
        let symbols = [0usize, 1, 2, 2, 2, 1, 0, 2, 2, 2, 2, 2];

        let mut encoder = RangeEncoder::new();
        let mut model = FrequencyModel::new(3);
        for &s in &symbols {
            encoder.encode_symbol(&mut model, s);
        }
        let encoded = encoder.finish();

        let mut decoder = RangeDecoder::new(&encoded, 0).unwrap();
        let mut model = FrequencyModel::new(3);
        for &s in &symbols {
            assert_eq!(decoder.decode_symbol(&mut model).unwrap(), s);
        }
        assert_eq!(decoder.position(), encoded.len());
    }

    #[test]
    fn test_direct_bits_mixed_with_symbols() {
        let mut encoder = RangeEncoder::new();
        let mut model = FrequencyModel::new(256);
        encoder.encode_symbol(&mut model, 200);
        encoder.encode_direct_bits(0x5A5A, 15);
        encoder.encode_symbol(&mut model, 7);
        encoder.encode_direct_bits(1, 1);
        let encoded = encoder.finish();

        let mut decoder = RangeDecoder::new(&encoded, 0).unwrap();
        let mut model = FrequencyModel::new(256);
        assert_eq!(decoder.decode_symbol(&mut model).unwrap(), 200);
        assert_eq!(decoder.decode_direct_bits(15).unwrap(), 0x5A5A & 0x7FFF);
        assert_eq!(decoder.decode_symbol(&mut model).unwrap(), 7);
        assert_eq!(decoder.decode_direct_bits(1).unwrap(), 1);
        assert_eq!(decoder.position(), encoded.len());
    }

    #[test]
    fn test_decoder_starts_mid_buffer() {
        let mut encoder = RangeEncoder::new();
        let mut model = FrequencyModel::new(4);
        for s in [3usize, 3, 1, 0] {
            encoder.encode_symbol(&mut model, s);
        }
        let mut framed = vec![0xEE, 0xEE, 0xEE];
        framed.extend_from_slice(&encoder.finish());
        framed.push(0xEE);

        let mut decoder = RangeDecoder::new(&framed, 3).unwrap();
        let mut model = FrequencyModel::new(4);
        for s in [3usize, 3, 1, 0] {
            assert_eq!(decoder.decode_symbol(&mut model).unwrap(), s);
        }
        assert_eq!(decoder.position(), framed.len() - 1);
    }

    #[test]
    fn test_truncated_stream() {
        assert!(matches!(
            RangeDecoder::new(&[0x00, 0x01], 0),
            Err(OxiXmlError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            RangeDecoder::new(&[0x07, 0, 0, 0, 0], 0),
            Err(OxiXmlError::CorruptedData { .. })
        ));
    }
}
