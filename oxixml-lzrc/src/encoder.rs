//! LZ77 match finding and range-coded token emission.
//!
//! The match finder keys every position by the exact value of its next three
//! bytes and keeps, per key, the positions in ascending order. Lookups walk
//! the newest candidates first and lazily drop candidates that have fallen
//! out of the [`MAX_OFFSET`] window.

use crate::config::LzConfig;
use crate::model::{LzModels, ceil_log2};
use crate::range_coder::RangeEncoder;
use crate::{
    FLAG_END_OF_STREAM, FLAG_LITERAL, FLAG_MATCH, LONG_OFFSET_SYMBOL, MAX_LENGTH,
    MAX_LITTLE_OFFSET, MAX_OFFSET, MAX_OFFSET_BITS, MIN_LENGTH,
};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// A token produced by the match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzToken {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Distance back into the output (1-32767).
        offset: u16,
        /// Number of bytes to copy (3-255).
        length: u16,
    },
}

impl LzToken {
    /// Number of input bytes this token covers.
    pub fn len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }

    /// Tokens always cover at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Key of the three bytes starting at `pos`.
#[inline(always)]
fn key_at(data: &[u8], pos: usize) -> u32 {
    ((data[pos] as u32) << 16) | ((data[pos + 1] as u32) << 8) | data[pos + 2] as u32
}

/// Hash-chained match finder over one input buffer.
#[derive(Debug)]
pub struct MatchFinder {
    config: LzConfig,
    /// Positions sharing a 3-byte key, oldest first.
    candidates: HashMap<u32, VecDeque<u32>>,
}

impl MatchFinder {
    /// Create an empty match finder.
    pub fn new(config: LzConfig) -> Self {
        Self {
            config,
            candidates: HashMap::new(),
        }
    }

    /// Register `pos` as a future match source.
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_LENGTH <= data.len() {
            self.candidates
                .entry(key_at(data, pos))
                .or_default()
                .push_back(pos as u32);
        }
    }

    /// Find the longest match for `pos` as `(offset, length)`.
    ///
    /// Ties go to the nearest candidate.
    fn find_match(&mut self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_LENGTH > data.len() || self.config.max_chain == 0 {
            return None;
        }

        let positions = self.candidates.get_mut(&key_at(data, pos))?;
        while let Some(&oldest) = positions.front() {
            if pos - oldest as usize >= MAX_OFFSET {
                positions.pop_front();
            } else {
                break;
            }
        }

        let remaining = data.len() - pos;
        let mut best: Option<(usize, usize)> = None;

        for &candidate in positions.iter().rev().take(self.config.max_chain) {
            let candidate = candidate as usize;
            let offset = pos - candidate;
            let max_len = remaining.min(MAX_LENGTH - 1).min(offset);

            let mut length = 0;
            while length < max_len && data[candidate + length] == data[pos + length] {
                length += 1;
            }

            if best.is_none_or(|(_, best_len)| length > best_len) {
                best = Some((offset, length));
                if length == MAX_LENGTH - 1 {
                    break;
                }
            }
        }

        best.filter(|&(_, length)| length >= self.config.min_length)
    }

    /// Split `data` into literal and match tokens.
    pub fn tokenize(mut self, data: &[u8]) -> Vec<LzToken> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            match self.find_match(data, pos) {
                Some((offset, length)) => {
                    tokens.push(LzToken::Match {
                        offset: offset as u16,
                        length: length as u16,
                    });
                    for covered in pos..pos + length {
                        self.insert(data, covered);
                    }
                    pos += length;
                }
                None => {
                    tokens.push(LzToken::Literal(data[pos]));
                    self.insert(data, pos);
                    pos += 1;
                }
            }
        }

        tokens
    }
}

/// LZ encoder: match finder plus range coder.
#[derive(Debug)]
pub struct LzEncoder {
    config: LzConfig,
    rc: RangeEncoder,
    models: LzModels,
}

impl LzEncoder {
    /// Create an encoder with fresh models.
    pub fn new(config: LzConfig) -> Self {
        Self {
            config,
            rc: RangeEncoder::new(),
            models: LzModels::new(),
        }
    }

    fn encode_literal(&mut self, byte: u8) {
        self.rc.encode_symbol(&mut self.models.flag, FLAG_LITERAL);
        self.rc.encode_symbol(&mut self.models.literal, byte as usize);
    }

    fn encode_match(&mut self, offset: u16, length: u16) {
        self.rc.encode_symbol(&mut self.models.flag, FLAG_MATCH);

        if offset as usize <= MAX_LITTLE_OFFSET {
            self.rc.encode_symbol(&mut self.models.offset, offset as usize);
        } else {
            self.rc
                .encode_symbol(&mut self.models.offset, LONG_OFFSET_SYMBOL);
            self.rc.encode_direct_bits(
                offset as u32 - LONG_OFFSET_SYMBOL as u32,
                MAX_OFFSET_BITS,
            );
        }

        let bucket = ceil_log2(offset as u32);
        self.rc
            .encode_symbol(&mut self.models.length[bucket], length as usize);
    }

    /// Compress `data` into a self-terminating stream.
    pub fn compress(mut self, data: &[u8]) -> Vec<u8> {
        let tokens = MatchFinder::new(self.config).tokenize(data);

        let mut matches = 0usize;
        for token in &tokens {
            match *token {
                LzToken::Literal(byte) => self.encode_literal(byte),
                LzToken::Match { offset, length } => {
                    matches += 1;
                    self.encode_match(offset, length);
                }
            }
        }
        self.rc.encode_symbol(&mut self.models.flag, FLAG_END_OF_STREAM);

        let out = self.rc.finish();
        trace!(
            input = data.len(),
            output = out.len(),
            literals = tokens.len() - matches,
            matches,
            "lz stream encoded"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(tokens: &[LzToken]) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        for token in tokens {
            match *token {
                LzToken::Literal(b) => out.push(b),
                LzToken::Match { offset, length } => {
                    let start = out.len() - offset as usize;
                    for i in 0..length as usize {
                        out.push(out[start + i]);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_short_input_is_literal() {
        let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(b"ab");
        assert_eq!(tokens, vec![LzToken::Literal(b'a'), LzToken::Literal(b'b')]);
    }

    #[test]
    fn test_simple_repeat() {
        let data = b"abcdefabcdef";
        let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(data);
        assert_eq!(tokens.len(), 7);
        assert_eq!(
            tokens[6],
            LzToken::Match {
                offset: 6,
                length: 6
            }
        );
        assert_eq!(expand(&tokens), data);
    }

    #[test]
    fn test_length_bounded_by_offset() {
        let data = vec![b'z'; 64];
        let tokens = MatchFinder::new(LzConfig::BEST).tokenize(&data);
        for token in &tokens {
            if let LzToken::Match { offset, length } = *token {
                assert!(length <= offset);
                assert!(length as usize >= MIN_LENGTH);
            }
        }
        assert_eq!(expand(&tokens), data);
    }

    #[test]
    fn test_length_capped() {
        let mut data: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();
        data.extend_from_within(0..600);
        let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(&data);
        assert!(tokens.iter().all(|t| t.len() < MAX_LENGTH));
        assert!(tokens.contains(&LzToken::Match {
            offset: 251,
            length: 251
        }));
        assert_eq!(expand(&tokens), data);
    }

    #[test]
    fn test_far_candidates_are_evicted() {
        let mut data = b"XYZ".to_vec();
        data.extend((0..MAX_OFFSET as u32).map(|i| 0x80 | (i % 97) as u8));
        data.extend_from_slice(b"XYZ");
        let tokens = MatchFinder::new(LzConfig::BEST).tokenize(&data);
        // The only earlier "XYZ" is too far away
        let tail = &tokens[tokens.len() - 3..];
        assert_eq!(
            tail,
            &[
                LzToken::Literal(b'X'),
                LzToken::Literal(b'Y'),
                LzToken::Literal(b'Z')
            ]
        );
        assert_eq!(expand(&tokens), data);
    }

    #[test]
    fn test_level_zero_only_literals() {
        let data = b"abcabcabcabcabc";
        let tokens = MatchFinder::new(LzConfig::from_level(0)).tokenize(data);
        assert_eq!(tokens.len(), data.len());
    }
}
