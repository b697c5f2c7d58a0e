//! Error types for cipher mode operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherModeError {
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid key length: {actual} bytes (expected {expected})")]
    InvalidKeyLength { expected: &'static str, actual: usize },

    #[error("Invalid IV length: {actual} bytes (must match block size {expected})")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("CBC mode requires an IV for decryption")]
    MissingIv,

    #[error("Padding error")]
    PaddingError,

    #[error("Invalid block size (must be > 0)")]
    InvalidBlockSize,
}

pub type Result<T> = std::result::Result<T, CipherModeError>;
