//! Vigenère cipher and its automatic breaker
//!
//! Breaking runs in three steps:
//! 1. Estimate the key length with the Index of Coincidence of interleaved columns.
//! 2. Recover each key letter by chi-squared matching of its column against English.
//! 3. Decrypt with the recovered key and report every cyclic rotation of it.

use tracing::{debug, warn};

use crate::english::{ENGLISH_FREQUENCIES, ENGLISH_IC, RANDOM_IC};
use crate::error::{AnalysisError, Result};
use crate::frequency::{letter_index, letter_indices, shift_char, LetterStats, ALPHABET_LEN};
use crate::scoring::Scorer;

pub const DEFAULT_MAX_KEY_LEN: usize = 50;
pub const DEFAULT_IC_TOLERANCE: f64 = 0.01;
pub const DEFAULT_CANDIDATES: usize = 3;

/// Key lengths whose columns would hold fewer letters than this are not tried.
const MIN_COLUMN_LETTERS: usize = 4;

/// Tuning for [`solve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VigenereConfig {
    /// Largest key length tried
    pub max_key_len: usize,
    /// The smallest key length whose average IC comes within this distance
    /// of `min(best IC, English IC)` is selected.
    pub ic_tolerance: f64,
    /// Number of alternative key lengths reported as candidates
    pub candidates: usize,
}

impl Default for VigenereConfig {
    fn default() -> Self {
        Self {
            max_key_len: DEFAULT_MAX_KEY_LEN,
            ic_tolerance: DEFAULT_IC_TOLERANCE,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

/// Converts a textual key into shifts (a=0 ... z=25), ignoring non-letters.
pub fn key_shifts(key: &str) -> Result<Vec<u8>> {
    let shifts = letter_indices(key);
    if shifts.is_empty() {
        return Err(AnalysisError::InvalidKey(format!("{key:?} contains no letters")));
    }
    Ok(shifts)
}

fn shifts_to_key(shifts: &[u8]) -> String {
    shifts.iter().map(|&s| (b'a' + s) as char).collect()
}

/// Shifts letter `i` of `text` by `shifts[(i + offset) % len]`, forward or
/// backward. Non-letters pass through and do not advance the key.
fn apply_key(text: &str, shifts: &[u8], offset: usize, forward: bool) -> String {
    let mut key_index = offset;
    text.chars()
        .map(|c| {
            if letter_index(c).is_none() {
                return c;
            }
            let shift = shifts[key_index % shifts.len()];
            key_index += 1;
            if forward {
                shift_char(c, shift)
            } else {
                shift_char(c, (ALPHABET_LEN as u8 - shift) % ALPHABET_LEN as u8)
            }
        })
        .collect()
}

pub fn encrypt(plaintext: &str, key: &str) -> Result<String> {
    Ok(apply_key(plaintext, &key_shifts(key)?, 0, true))
}

pub fn decrypt(ciphertext: &str, key: &str) -> Result<String> {
    decrypt_with_offset(ciphertext, key, 0)
}

/// Decrypts with the key stream starting at key position `offset`.
///
/// Rotation `r` of a key of length `n` recovers the plaintext with offset `(n - r) % n`.
pub fn decrypt_with_offset(ciphertext: &str, key: &str, offset: usize) -> Result<String> {
    Ok(apply_key(ciphertext, &key_shifts(key)?, offset, false))
}

fn column_stats(letters: &[u8], key_len: usize) -> Vec<LetterStats> {
    (0..key_len)
        .map(|i| LetterStats::from_indices(letters.iter().skip(i).step_by(key_len).copied()))
        .collect()
}

/// Average Index of Coincidence of the interleaved columns for every key
/// length from 1 up to `max_key_len`, skipping lengths whose columns would
/// be too short to measure.
pub fn key_length_scores(letters: &[u8], max_key_len: usize) -> Vec<(usize, f64)> {
    let cap = max_key_len.min(letters.len() / MIN_COLUMN_LETTERS).max(1);

    (1..=cap)
        .map(|key_len| {
            let columns = column_stats(letters, key_len);
            let total: f64 = columns.iter().map(LetterStats::index_of_coincidence).sum();
            (key_len, total / key_len as f64)
        })
        .collect()
}

/// Picks the smallest key length whose average IC is within `tolerance` of
/// `min(best, English IC)`. Multiples of the true period score about as well
/// as the period itself, so the smallest qualifying length wins.
pub fn select_key_length(scores: &[(usize, f64)], tolerance: f64) -> usize {
    let best = scores.iter().map(|&(_, ic)| ic).fold(f64::NEG_INFINITY, f64::max);
    let threshold = best.min(ENGLISH_IC) - tolerance;

    scores
        .iter()
        .find(|&&(_, ic)| ic >= threshold)
        .map(|&(key_len, _)| key_len)
        .unwrap_or(1)
}

/// The shift minimizing chi-squared between the unshifted column and English.
fn best_shift(column: &LetterStats) -> u8 {
    let total = column.total() as f64;
    let mut best_shift = 0;
    let mut best_chi_squared = f64::INFINITY;

    for shift in 0..ALPHABET_LEN {
        let chi_squared = column.chi_squared_shifted(&ENGLISH_FREQUENCIES, shift, total);
        if chi_squared < best_chi_squared {
            best_chi_squared = chi_squared;
            best_shift = shift;
        }
    }

    best_shift as u8
}

/// Recovers a key of `key_len` letters, one chi-squared fit per column.
pub fn recover_key(letters: &[u8], key_len: usize) -> String {
    let shifts: Vec<u8> = column_stats(letters, key_len.max(1)).iter().map(best_shift).collect();
    shifts_to_key(&shifts)
}

/// Collapses a key that repeats a shorter key (`lemonlemon` becomes `lemon`).
pub fn normalize_key(key: &str) -> String {
    let n = key.len();
    for size in 1..n {
        if n % size == 0 && key.as_bytes().chunks(size).all(|chunk| chunk == &key.as_bytes()[..size]) {
            return key[..size].to_string();
        }
    }
    key.to_string()
}

/// All cyclic rotations of `key`; rotation `r` starts at `key[r]`.
/// Rotation 0, the key itself, comes first.
pub fn rotations(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    (0..chars.len())
        .map(|r| chars[r..].iter().chain(&chars[..r]).collect())
        .collect()
}

/// One solved key length.
#[derive(Debug, Clone, PartialEq)]
pub struct VigenereCandidate {
    pub key: String,
    pub key_len: usize,
    pub score: f64,
    pub plaintext: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VigenereSolution {
    /// Recovered key in lowercase, aligned with the first ciphertext letter
    pub key: String,
    pub key_len: usize,
    pub plaintext: String,
    pub score: f64,
    /// Every rotation of `key`, starting with `key` itself
    pub rotations: Vec<String>,
    /// Solutions for the key lengths with the highest IC, best score first
    pub candidates: Vec<VigenereCandidate>,
}

fn solve_length<S: Scorer + ?Sized>(
    ciphertext: &str,
    letters: &[u8],
    key_len: usize,
    scorer: &S,
) -> Result<VigenereCandidate> {
    let key = normalize_key(&recover_key(letters, key_len));
    let plaintext = decrypt(ciphertext, &key)?;
    Ok(VigenereCandidate {
        key_len: key.len(),
        score: scorer.score(&plaintext),
        key,
        plaintext,
    })
}

/// Breaks a Vigenère ciphertext without knowing the key. `scorer` ranks the
/// plaintexts of the candidate key lengths.
///
/// Short or non-English input still produces an answer; a warning is logged
/// when the key-length evidence is weak.
pub fn solve<S: Scorer + ?Sized>(ciphertext: &str, config: &VigenereConfig, scorer: &S) -> Result<VigenereSolution> {
    if ciphertext.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let letters = letter_indices(ciphertext);
    if letters.is_empty() {
        warn!("ciphertext has no letters, nothing to recover");
        return Ok(VigenereSolution {
            key: "a".to_string(),
            key_len: 1,
            plaintext: ciphertext.to_string(),
            score: scorer.score(ciphertext),
            rotations: vec!["a".to_string()],
            candidates: Vec::new(),
        });
    }

    let scores = key_length_scores(&letters, config.max_key_len.max(1));
    let key_len = select_key_length(&scores, config.ic_tolerance);
    let selected_ic = scores
        .iter()
        .find(|&&(len, _)| len == key_len)
        .map_or(0.0, |&(_, ic)| ic);

    if selected_ic < (ENGLISH_IC + RANDOM_IC) / 2.0 {
        warn!(letters = letters.len(), ic = selected_ic, "weak key length evidence, result is a best guess");
    }
    debug!(key_len, ic = selected_ic, tried = scores.len(), "estimated key length");

    let best = solve_length(ciphertext, &letters, key_len, scorer)?;

    // alternatives: the other key lengths with the highest IC
    let mut ranked = scores.clone();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut candidates = vec![best.clone()];
    for &(len, _) in &ranked {
        if candidates.len() >= config.candidates.max(1) {
            break;
        }
        if len == key_len {
            continue;
        }
        let candidate = solve_length(ciphertext, &letters, len, scorer)?;
        if candidates.iter().all(|c| c.key != candidate.key) {
            candidates.push(candidate);
        }
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.key_len.cmp(&b.key_len)));

    debug!(key = %best.key, score = best.score, "recovered vigenere key");

    Ok(VigenereSolution {
        rotations: rotations(&best.key),
        key: best.key,
        key_len: best.key_len,
        plaintext: best.plaintext,
        score: best.score,
        candidates,
    })
}
