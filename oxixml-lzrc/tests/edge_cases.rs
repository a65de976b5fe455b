//! Edge case tests for LZ + range coder streams.

use oxixml_lzrc::{LzConfig, LzToken, MAX_OFFSET, MatchFinder, compress, decompress};

fn roundtrip(input: &[u8]) -> Vec<u8> {
    let compressed = compress(input, &LzConfig::DEFAULT);
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(decompressed, input);
    compressed
}

/// Pseudo-random bytes from a linear congruential generator.
fn noise(size: usize, mut seed: u64) -> Vec<u8> {
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}

#[test]
fn test_empty_input() {
    roundtrip(b"");
}

#[test]
fn test_shorter_than_min_length() {
    roundtrip(b"A");
    roundtrip(b"AB");
}

#[test]
fn test_all_same_byte() {
    let input = vec![255u8; 5000];
    let compressed = roundtrip(&input);
    assert!(compressed.len() < input.len() / 20);
}

#[test]
fn test_all_byte_values() {
    let input: Vec<u8> = (0..=255u8).cycle().take(2000).collect();
    roundtrip(&input);
}

#[test]
fn test_random_data() {
    roundtrip(&noise(20_000, 0x1234_5678));
}

#[test]
fn test_larger_than_window() {
    // Repeats both inside and beyond the 32 KiB window
    let block = noise(10_000, 42);
    let mut input = Vec::new();
    for _ in 0..5 {
        input.extend_from_slice(&block);
        input.extend_from_slice(&noise(1_000, input.len() as u64));
    }
    assert!(input.len() > MAX_OFFSET);
    let compressed = roundtrip(&input);
    assert!(compressed.len() < input.len());
}

#[test]
fn test_long_offsets_use_raw_bits() {
    let block = noise(3_000, 7);
    let mut input = block.clone();
    input.extend_from_slice(&noise(20_000, 8));
    input.extend_from_slice(&block);
    roundtrip(&input);

    let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(&input);
    assert!(
        tokens
            .iter()
            .any(|t| matches!(t, LzToken::Match { offset: 23_000, .. }))
    );
}

#[test]
fn test_repeat_at_offset_500_is_one_match() {
    let pattern = b"ABCDEFGHIJ";
    // Filler never contains pattern bytes, and repeats with period 128, which
    // does not divide 500
    let mut input: Vec<u8> = (0..1200usize).map(|i| 0x80 + (i % 128) as u8).collect();
    input[100..110].copy_from_slice(pattern);
    input[600..610].copy_from_slice(pattern);

    let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(&input);

    let mut pos = 0;
    let mut found = None;
    for token in &tokens {
        if pos == 600 {
            found = Some(*token);
        }
        pos += token.len();
    }
    assert_eq!(
        found,
        Some(LzToken::Match {
            offset: 500,
            length: 10
        })
    );

    roundtrip(&input);
}

#[test]
fn test_long_repeat_is_capped() {
    let mut segment = noise(300, 99);
    // Keep the zero run from extending into the second copy
    segment[0] = 0x5A;
    let mut input = segment.clone();
    input.extend(std::iter::repeat_n(0x00, 200));
    input.extend_from_slice(&segment);

    let tokens = MatchFinder::new(LzConfig::DEFAULT).tokenize(&input);
    assert!(tokens.contains(&LzToken::Match {
        offset: 500,
        length: 255
    }));
    roundtrip(&input);
}

#[test]
fn test_every_level_roundtrips() {
    let input = b"<a><b x=\"1\">hi</b><b x=\"2\">there</b></a>".repeat(50);
    for level in 0..=9 {
        let compressed = compress(&input, &LzConfig::from_level(level));
        assert_eq!(decompress(&compressed).unwrap(), input);
    }
}
