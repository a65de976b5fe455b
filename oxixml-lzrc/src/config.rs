//! Match-finder configuration.
//!
//! Both knobs only steer the encoder's search. The coded stream does not
//! record them and the decoder never needs them, so any preset can be read
//! back by any decoder.

use crate::{MAX_LENGTH, MIN_LENGTH};

/// Maximum chain depth per compression level.
const CHAIN_DEPTH: [usize; 10] = [
    0,     // Level 0: literals only
    4,     // Level 1: Very fast
    8,     // Level 2: Fast
    16,    // Level 3: Fast
    32,    // Level 4: Normal
    64,    // Level 5: Normal
    256,   // Level 6: Normal (default)
    1024,  // Level 7: High
    4096,  // Level 8: High
    usize::MAX, // Level 9: Best (every candidate in the window)
];

/// LZ match-finder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzConfig {
    /// Shortest match worth a match token (at least 3).
    pub min_length: usize,
    /// Maximum number of candidate positions examined per lookup.
    pub max_chain: usize,
}

impl LzConfig {
    /// Fast search.
    pub const FAST: Self = Self {
        min_length: MIN_LENGTH,
        max_chain: 8,
    };

    /// Default search.
    pub const DEFAULT: Self = Self {
        min_length: MIN_LENGTH,
        max_chain: 256,
    };

    /// Exhaustive search over the whole window.
    pub const BEST: Self = Self {
        min_length: MIN_LENGTH,
        max_chain: usize::MAX,
    };

    /// Create a configuration for a compression level (0-9).
    ///
    /// Level 0 never emits matches.
    pub fn from_level(level: u8) -> Self {
        let level = level.min(9) as usize;
        let min_length = if level == 0 { MAX_LENGTH } else { MIN_LENGTH };
        Self {
            min_length,
            max_chain: CHAIN_DEPTH[level],
        }
    }

    /// Create a configuration, clamping `min_length` to the valid range.
    pub fn new(min_length: usize, max_chain: usize) -> Self {
        Self {
            min_length: min_length.clamp(MIN_LENGTH, MAX_LENGTH),
            max_chain,
        }
    }
}

impl Default for LzConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LzConfig::default(), LzConfig::DEFAULT);
        assert_eq!(LzConfig::from_level(6), LzConfig::DEFAULT);
        assert_eq!(LzConfig::from_level(9), LzConfig::BEST);
        assert_eq!(LzConfig::from_level(2), LzConfig::FAST);
    }

    #[test]
    fn test_level_clamp() {
        assert_eq!(LzConfig::from_level(42), LzConfig::BEST);
    }

    #[test]
    fn test_level_zero_disables_matches() {
        let config = LzConfig::from_level(0);
        assert_eq!(config.max_chain, 0);
        assert!(config.min_length >= MAX_LENGTH);
    }

    #[test]
    fn test_min_length_clamp() {
        assert_eq!(LzConfig::new(1, 16).min_length, MIN_LENGTH);
        assert_eq!(LzConfig::new(1000, 16).min_length, MAX_LENGTH);
    }
}
