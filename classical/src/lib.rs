//! # Classical cryptanalysis
//!
//! Letter statistics and automatic breakers for the classical ciphers:
//!
//! - [`caesar`]: brute force over all 26 shifts, ranked by a word-match score
//! - [`vigenere`]: Index of Coincidence key length estimation and chi-squared
//!   key recovery
//! - [`substitution`]: a bijective mapping type plus hill-climbing and
//!   simulated-annealing search guided by an n-gram model
//!
//! Scoring is pluggable through [`Scorer`]; [`NgramModel`] and
//! [`WordListScorer`] are the two implementations shipped here.

pub mod caesar;
pub mod english;
pub mod error;
pub mod frequency;
pub mod scoring;
pub mod substitution;
pub mod vigenere;

pub use error::{AnalysisError, Result};
pub use frequency::{LetterStat, LetterStats};
pub use scoring::{NgramModel, Scorer, WordListScorer};
pub use substitution::{Algorithm, SolverConfig, SubstitutionMapping, SubstitutionSolver};
pub use vigenere::VigenereConfig;
