//! Utility functions for cipher modes

use crate::error::{CipherModeError, Result};

/// Add PKCS#7 padding to data.
///
/// Always appends between 1 and `block_size` bytes, each holding the pad
/// length, so already-aligned input gains a full block.
pub fn add_padding(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(CipherModeError::InvalidBlockSize);
    }

    let padding_needed = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + padding_needed);
    padded.extend_from_slice(data);
    padded.resize(data.len() + padding_needed, padding_needed as u8);

    Ok(padded)
}

/// Remove and validate PKCS#7 padding.
pub fn remove_padding(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(CipherModeError::InvalidBlockSize);
    }

    let &last = data.last().ok_or(CipherModeError::PaddingError)?;
    let pad_len = last as usize;

    if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
        return Err(CipherModeError::PaddingError);
    }

    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| b != last) {
        return Err(CipherModeError::PaddingError);
    }

    Ok(body.to_vec())
}

/// XOR two byte arrays
pub fn xor_blocks(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(CipherModeError::InvalidBlockSize);
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect())
}
