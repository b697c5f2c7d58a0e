//! Hex and base64 text forms of byte sequences

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{CipherModeError, Result};

/// Lowercase hex, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse hex text. Leading and trailing whitespace is ignored; anything
/// else that is not a hex digit is rejected.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(|e| CipherModeError::InvalidEncoding(format!("hex: {e}")))
}

/// Standard base64 alphabet with `=` padding.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CipherModeError::InvalidEncoding(format!("base64: {e}")))
}
