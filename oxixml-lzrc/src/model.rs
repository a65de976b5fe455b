//! Adaptive frequency models.
//!
//! Every channel of the LZ stream (flag, literal, offset, and one length model
//! per offset magnitude) owns a [`FrequencyModel`]. Encoder and decoder start
//! from identical fresh models and apply identical updates after every
//! symbol, so their states never diverge on a well-formed stream.

use crate::range_coder::MAX_TOTAL;

/// Frequency added to a symbol each time it is coded.
pub const INCREMENT: u32 = 24;

/// Number of symbols in the flag alphabet (match, literal, end of stream).
pub const FLAG_ALPHABET_SIZE: usize = 3;

/// Number of symbols in the literal alphabet.
pub const LITERAL_ALPHABET_SIZE: usize = 256;

/// Number of symbols in the offset alphabet (0..=250 direct, 251 long).
pub const OFFSET_ALPHABET_SIZE: usize = 252;

/// Number of symbols in each length alphabet.
pub const LENGTH_ALPHABET_SIZE: usize = crate::MAX_LENGTH;

/// Number of length models, one per `ceil_log2(offset)` bucket.
pub const LENGTH_MODEL_COUNT: usize = crate::MAX_OFFSET_BITS as usize + 1;

/// Adaptive order-0 frequency table over a fixed alphabet.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    freqs: Vec<u32>,
    total: u32,
}

impl FrequencyModel {
    /// Create a model where every symbol starts with frequency 1.
    pub fn new(alphabet_size: usize) -> Self {
        debug_assert!(alphabet_size > 0 && (alphabet_size as u32) < MAX_TOTAL / 2);
        Self {
            freqs: vec![1; alphabet_size],
            total: alphabet_size as u32,
        }
    }

    /// Number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.freqs.len()
    }

    /// Sum of all frequencies.
    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Frequency of `symbol`.
    pub fn freq(&self, symbol: usize) -> u32 {
        self.freqs[symbol]
    }

    /// Cumulative frequency and frequency of `symbol`.
    pub fn range_of(&self, symbol: usize) -> (u32, u32) {
        let cum = self.freqs[..symbol].iter().sum();
        (cum, self.freqs[symbol])
    }

    /// Symbol whose interval contains `target`, with its interval.
    pub fn find(&self, target: u32) -> (usize, u32, u32) {
        let mut cum = 0u32;
        for (symbol, &freq) in self.freqs.iter().enumerate() {
            if target < cum + freq {
                return (symbol, cum, freq);
            }
            cum += freq;
        }
        // `target < total` always holds; fall back to the last symbol
        let last = self.freqs.len() - 1;
        (last, cum - self.freqs[last], self.freqs[last])
    }

    /// Record one occurrence of `symbol`.
    pub fn update(&mut self, symbol: usize) {
        self.freqs[symbol] += INCREMENT;
        self.total += INCREMENT;
        if self.total > MAX_TOTAL {
            self.rescale();
        }
    }

    /// Halve every frequency, keeping each at least 1.
    fn rescale(&mut self) {
        let mut total = 0;
        for freq in &mut self.freqs {
            *freq = freq.div_ceil(2);
            total += *freq;
        }
        self.total = total;
    }
}

/// The full set of models used to code one LZ stream.
#[derive(Debug, Clone)]
pub struct LzModels {
    /// Match / literal / end-of-stream flag.
    pub flag: FrequencyModel,
    /// Literal bytes.
    pub literal: FrequencyModel,
    /// Small offsets and the long-offset escape.
    pub offset: FrequencyModel,
    /// Match lengths, selected by `ceil_log2(offset)`.
    pub length: Vec<FrequencyModel>,
}

impl LzModels {
    /// Fresh models for a new stream.
    pub fn new() -> Self {
        Self {
            flag: FrequencyModel::new(FLAG_ALPHABET_SIZE),
            literal: FrequencyModel::new(LITERAL_ALPHABET_SIZE),
            offset: FrequencyModel::new(OFFSET_ALPHABET_SIZE),
            length: (0..LENGTH_MODEL_COUNT)
                .map(|_| FrequencyModel::new(LENGTH_ALPHABET_SIZE))
                .collect(),
        }
    }
}

impl Default for LzModels {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest `n` with `2^n >= value`; 0 for values 0 and 1.
#[inline]
pub fn ceil_log2(value: u32) -> usize {
    if value <= 1 {
        0
    } else {
        (u32::BITS - (value - 1).leading_zeros()) as usize
    }
}
