//! Errors surfaced at the lab boundary

use cipher_modes::CipherModeError;
use classical::AnalysisError;
use thiserror::Error;

use crate::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum LabError {
    #[error(transparent)]
    Cipher(#[from] CipherModeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing ciphertext: supply ciphertextHex or ciphertextBase64")]
    MissingCiphertext,

    #[error("Unknown key type: {0} (expected des, aes128, aes192 or aes256)")]
    UnknownKeyType(String),
}

impl LabError {
    /// The `{error}` object handed back to callers.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse { error: self.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;
