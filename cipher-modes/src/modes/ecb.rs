//! ECB (Electronic Code Book) mode implementation

use crate::{utils, BlockCipher, Result};

use super::CipherModes;

impl CipherModes {
    /// ECB mode encryption
    pub fn ecb_encrypt<C: BlockCipher + ?Sized>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_block_size(block_size)?;

        let padded_data: Vec<u8> = utils::add_padding(plaintext, block_size)?;
        let mut ciphertext: Vec<u8> = Vec::with_capacity(padded_data.len());

        for chunk in padded_data.chunks(block_size) {
            let encrypted_block = cipher.encrypt(chunk)?;
            ciphertext.extend(encrypted_block);
        }

        Ok(ciphertext)
    }

    /// ECB mode decryption
    pub fn ecb_decrypt<C: BlockCipher + ?Sized>(cipher: &C, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_block_size(block_size)?;
        Self::validate_ciphertext_length(ciphertext, block_size)?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());

        for chunk in ciphertext.chunks(block_size) {
            let decrypted_block = cipher.decrypt(chunk)?;
            plaintext.extend(decrypted_block);
        }

        utils::remove_padding(&plaintext, block_size)
    }
}
