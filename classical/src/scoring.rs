//! Pluggable English-likeness scores
//!
//! Every analyzer ranks candidate plaintexts through the [`Scorer`] trait, so
//! the word-match score, the n-gram model or a small test model can be swapped
//! without touching the search code.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::english::{COMMON_WORDS, SAMPLE_CORPUS};
use crate::error::{AnalysisError, Result};
use crate::frequency::{letter_indices, ALPHABET_LEN};

/// Score returned for texts too short to carry any n-gram evidence.
pub const MIN_SCORE: f64 = -999_999.0;

/// Higher scores mean more English-like text.
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn score(&self, text: &str) -> f64 {
        (**self).score(text)
    }
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, text: &str) -> f64 {
        (**self).score(text)
    }
}

impl<S: Scorer + ?Sized> Scorer for Arc<S> {
    fn score(&self, text: &str) -> f64 {
        (**self).score(text)
    }
}

/// Counts how many words of the text belong to a fixed word list.
///
/// The text is uppercased and split on every non-letter.
#[derive(Debug, Clone)]
pub struct WordListScorer {
    words: HashSet<String>,
}

impl WordListScorer {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_ascii_uppercase()).collect(),
        }
    }

    /// The common short English words: THE, AND, IS, TO, ...
    pub fn english() -> Self {
        Self::new(COMMON_WORDS)
    }

    pub fn matches(&self, text: &str) -> usize {
        text.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|w| !w.is_empty())
            .filter(|w| self.words.contains(&w.to_ascii_uppercase()))
            .count()
    }
}

impl Scorer for WordListScorer {
    fn score(&self, text: &str) -> f64 {
        self.matches(text) as f64
    }
}

/// Log10 probabilities of every n-gram of one order, indexed in base 26.
#[derive(Clone)]
struct NgramTable {
    n: usize,
    log_probs: Vec<f64>,
    floor: f64,
}

impl NgramTable {
    /// Turns raw counts into log10 probabilities. Unseen n-grams get the
    /// floor `min(log10 p) - 1`.
    fn from_counts(n: usize, counts: &[f64]) -> Result<Self> {
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return Err(AnalysisError::NgramModel(format!("no {n}-grams to build a table from")));
        }

        let mut log_probs = vec![f64::NAN; counts.len()];
        let mut min = f64::INFINITY;
        for (slot, &count) in log_probs.iter_mut().zip(counts) {
            if count > 0.0 {
                let log_prob = (count / total).log10();
                min = min.min(log_prob);
                *slot = log_prob;
            }
        }

        let floor = min - 1.0;
        for slot in log_probs.iter_mut().filter(|p| p.is_nan()) {
            *slot = floor;
        }

        Ok(Self { n, log_probs, floor })
    }

    /// Mean log-probability over all n-grams of `letters`.
    fn mean_log_prob(&self, letters: &[u8]) -> f64 {
        let windows = letters.len().saturating_sub(self.n - 1);
        if windows == 0 {
            return 0.0;
        }

        let sum: f64 = letters
            .windows(self.n)
            .map(|gram| self.log_probs[gram_index(gram)])
            .sum();
        sum / windows as f64
    }
}

fn gram_index(gram: &[u8]) -> usize {
    gram.iter().fold(0, |acc, &c| acc * ALPHABET_LEN + c as usize)
}

fn table_len(n: usize) -> usize {
    ALPHABET_LEN.pow(n as u32)
}

/// Weighted mono/bi/tri/quadgram log-likelihood model.
///
/// The score of a text is `1.0*quad + 0.5*tri + 0.2*bi + 0.1*mono`, each term
/// the mean log10 probability of the text's letter n-grams of that order.
/// Texts with fewer than four letters score [`MIN_SCORE`].
#[derive(Clone)]
pub struct NgramModel {
    // orders 1 to 4
    tables: [NgramTable; 4],
}

const WEIGHTS: [f64; 4] = [0.1, 0.2, 0.5, 1.0];

const NGRAM_FILES: [&str; 4] = [
    "english_monograms.txt",
    "english_bigrams.txt",
    "english_trigrams.txt",
    "english_quadgrams.txt",
];

impl NgramModel {
    /// Builds a model from the n-gram counts of a training text. Only the
    /// letters are used; everything else is dropped before counting.
    pub fn from_corpus(corpus: &str) -> Result<Self> {
        let letters = letter_indices(corpus);
        if letters.len() < 4 {
            return Err(AnalysisError::NgramModel(format!(
                "training text has {} letters, need at least 4",
                letters.len()
            )));
        }

        let build = |n: usize| {
            let mut counts = vec![0.0; table_len(n)];
            for gram in letters.windows(n) {
                counts[gram_index(gram)] += 1.0;
            }
            NgramTable::from_counts(n, &counts)
        };

        let model = Self {
            tables: [build(1)?, build(2)?, build(3)?, build(4)?],
        };
        debug!(letters = letters.len(), "trained n-gram model from corpus");
        Ok(model)
    }

    /// The model trained on the built-in English sample.
    pub fn english() -> Result<Self> {
        Self::from_corpus(SAMPLE_CORPUS)
    }

    /// Loads `english_{mono,bi,tri,quad}grams.txt` from `dir`. Each line holds
    /// an n-gram and its count separated by whitespace (`TION 1234`).
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let load = |n: usize| {
            let path = dir.join(NGRAM_FILES[n - 1]);
            let text = fs::read_to_string(&path)
                .map_err(|e| AnalysisError::NgramModel(format!("{}: {e}", path.display())))?;
            Self::parse_counts(n, &text)
        };

        let model = Self {
            tables: [load(1)?, load(2)?, load(3)?, load(4)?],
        };
        debug!(dir = %dir.display(), "loaded n-gram model");
        Ok(model)
    }

    /// Parses one `GRAM COUNT` listing. Lines that are not an `n`-letter gram
    /// followed by a number are skipped.
    fn parse_counts(n: usize, text: &str) -> Result<NgramTable> {
        let mut counts = vec![0.0; table_len(n)];

        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let (Some(gram), Some(count)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(count) = count.parse::<f64>() else {
                continue;
            };
            let indices = letter_indices(gram);
            if indices.len() != n || gram.len() != n || count < 0.0 {
                continue;
            }
            counts[gram_index(&indices)] += count;
        }

        NgramTable::from_counts(n, &counts)
    }

    /// Scores a text given as alphabet positions.
    pub fn score_letters(&self, letters: &[u8]) -> f64 {
        if letters.len() < 4 {
            return MIN_SCORE;
        }

        self.tables
            .iter()
            .zip(WEIGHTS)
            .map(|(table, weight)| weight * table.mean_log_prob(letters))
            .sum()
    }

    /// Log-probability assigned to n-grams never seen in training, per order.
    pub fn floors(&self) -> [f64; 4] {
        [0, 1, 2, 3].map(|i| self.tables[i].floor)
    }
}

impl std::fmt::Debug for NgramModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NgramModel").field("floors", &self.floors()).finish()
    }
}

impl Scorer for NgramModel {
    fn score(&self, text: &str) -> f64 {
        self.score_letters(&letter_indices(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("classical-ngrams-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_word_list_scorer() {
        let scorer = WordListScorer::english();
        assert_eq!(scorer.score("The cat and the dog."), 3.0);
        assert_eq!(scorer.score("it's THE end,of it"), 4.0);
        assert_eq!(scorer.score("xyz qrs"), 0.0);
        assert_eq!(scorer.score(""), 0.0);
    }

    #[test]
    fn test_custom_word_list() {
        let scorer = WordListScorer::new(["attack", "dawn"]);
        assert_eq!(scorer.matches("Attack at dawn!"), 2);
    }

    #[test]
    fn test_short_text_scores_minimum() {
        let model = NgramModel::from_corpus("the quick brown fox").unwrap();
        assert_eq!(model.score("abc"), MIN_SCORE);
        assert_eq!(model.score("a-b-c!"), MIN_SCORE);
        assert!(model.score("abcd") > MIN_SCORE);
    }

    #[test]
    fn test_corpus_too_small() {
        assert!(matches!(NgramModel::from_corpus("ab c"), Err(AnalysisError::NgramModel(_))));
    }

    #[test]
    fn test_english_model_prefers_english() {
        let model = NgramModel::english().unwrap();
        let english = model.score("attack the east wall of the castle at dawn");
        let scrambled = model.score("qxzv jkq wplz bfm yxq vgkzjp qz wxnm");
        assert!(english > scrambled, "{english} <= {scrambled}");
        assert!(english < 0.0);
    }

    #[test]
    fn test_floor_is_below_every_seen_gram() {
        let model = NgramModel::from_corpus("aaab").unwrap();
        let floors = model.floors();
        // monograms: a = 3/4, b = 1/4
        assert!((floors[0] - ((0.25f64).log10() - 1.0)).abs() < 1e-12);
        // the only quadgram has probability 1
        assert!((floors[3] - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_known_score_value() {
        let model = NgramModel::from_corpus("abcd").unwrap();
        // mono: 4 letters each 1/4; bi: 3 grams each 1/3; tri: 2 each 1/2; quad: 1 of 1
        let expected = 0.1 * (0.25f64).log10() + 0.2 * (1.0f64 / 3.0).log10() + 0.5 * (0.5f64).log10();
        assert!((model.score("abcd") - expected).abs() < 1e-12);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = temp_dir("load");
        fs::write(dir.join("english_monograms.txt"), "E 12\nT 9\nbad line\nQ x\n").unwrap();
        fs::write(dir.join("english_bigrams.txt"), "TH 10\nHE 8\n").unwrap();
        fs::write(dir.join("english_trigrams.txt"), "THE 7\n").unwrap();
        fs::write(dir.join("english_quadgrams.txt"), "TION 5\nTHER 5\n").unwrap();

        let model = NgramModel::from_dir(&dir).unwrap();
        assert!(model.score("ther") > model.score("zzzz"));
        // quadgram table: TION and THER each 1/2
        assert!((model.floors()[3] - ((0.5f64).log10() - 1.0)).abs() < 1e-12);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_missing_dir() {
        let dir = temp_dir("missing").join("nope");
        assert!(matches!(NgramModel::from_dir(&dir), Err(AnalysisError::NgramModel(_))));
    }

    #[test]
    fn test_scorers_behind_pointers() {
        let boxed: Box<dyn Scorer> = Box::new(WordListScorer::english());
        let shared: Arc<dyn Scorer> = Arc::new(WordListScorer::english());
        assert_eq!(boxed.score("the end"), 1.0);
        assert_eq!(shared.score("to be"), 1.0);
    }
}
