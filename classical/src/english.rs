//! Reference statistics for English text

use crate::frequency::ALPHABET_LEN;

/// Relative letter frequencies of English, a-z.
pub const ENGLISH_FREQUENCIES: [f64; ALPHABET_LEN] = [
    0.08167, 0.01492, 0.02782, 0.04253, 0.12702, 0.02228, 0.02015,
    0.06094, 0.06966, 0.00153, 0.00772, 0.04025, 0.02406, 0.06749,
    0.07507, 0.01929, 0.00095, 0.05987, 0.06327, 0.09056, 0.02758,
    0.00978, 0.02360, 0.00150, 0.01974, 0.00074,
];

/// Index of Coincidence of typical English prose.
pub const ENGLISH_IC: f64 = 0.0667;

/// Index of Coincidence of uniformly random letters (1/26).
pub const RANDOM_IC: f64 = 1.0 / ALPHABET_LEN as f64;

/// English letters from most to least frequent.
pub const FREQUENCY_ORDER: &[u8; ALPHABET_LEN] = b"etaoinshrdlcumwfgypbvkjxqz";

/// Short words counted by the word-match score.
pub const COMMON_WORDS: [&str; 10] = ["THE", "AND", "IS", "TO", "OF", "IN", "THAT", "IT", "FOR", "ARE"];

/// A few pages of plain English prose, used to train the built-in n-gram model.
pub const SAMPLE_CORPUS: &str = include_str!("../data/english_sample.txt");
