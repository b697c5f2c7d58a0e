//! Caesar (additive) cipher and its brute-force breaker

use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::frequency::{shift_char, ALPHABET_LEN};
use crate::scoring::Scorer;

/// Shifts every letter forward by `key`, preserving case and non-letters.
pub fn encrypt(plaintext: &str, key: u8) -> String {
    plaintext.chars().map(|c| shift_char(c, key % 26)).collect()
}

/// Shifts every letter back by `key`.
pub fn decrypt(ciphertext: &str, key: u8) -> String {
    encrypt(ciphertext, (26 - key % 26) % 26)
}

/// One decryption attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CaesarCandidate {
    pub key: u8,
    pub plaintext: String,
    pub score: f64,
}

/// Result of trying every shift.
#[derive(Debug, Clone, PartialEq)]
pub struct CaesarSolution {
    pub best: CaesarCandidate,
    /// All 26 candidates ordered by key.
    pub candidates: Vec<CaesarCandidate>,
}

/// Tries all 26 shifts and keeps the candidate with the highest score.
/// Ties go to the smallest key, so text without letters resolves to key 0.
pub fn solve<S: Scorer + ?Sized>(ciphertext: &str, scorer: &S) -> Result<CaesarSolution> {
    if ciphertext.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if !ciphertext.chars().any(|c| c.is_ascii_alphabetic()) {
        warn!("ciphertext has no letters, every shift decrypts to the same text");
    }

    let candidates: Vec<CaesarCandidate> = (0..ALPHABET_LEN as u8)
        .map(|key| {
            let plaintext = decrypt(ciphertext, key);
            let score = scorer.score(&plaintext);
            CaesarCandidate { key, plaintext, score }
        })
        .collect();

    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        if candidate.score > best.score {
            best = candidate;
        }
    }
    let best = best.clone();

    debug!(key = best.key, score = best.score, "caesar brute force finished");
    Ok(CaesarSolution { best, candidates })
}
