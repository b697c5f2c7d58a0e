//! Error types for the classical analyzers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Empty input: no ciphertext supplied")]
    EmptyInput,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("N-gram model error: {0}")]
    NgramModel(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
