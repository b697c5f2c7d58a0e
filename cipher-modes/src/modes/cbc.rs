//! CBC (Cipher Block Chaining) mode implementation

use crate::{utils, BlockCipher, Result};

use super::CipherModes;

impl CipherModes {
    /// CBC mode encryption
    ///
    /// C_0 = IV, C_i = E(K, P_i ⊕ C_{i-1})
    pub fn cbc_encrypt<C: BlockCipher + ?Sized>(cipher: &C, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_block_size(block_size)?;
        Self::validate_iv_length(iv, block_size)?;

        let padded_data = utils::add_padding(plaintext, block_size)?;
        let mut ciphertext = Vec::with_capacity(padded_data.len());
        let mut previous_block = iv.to_vec();

        for chunk in padded_data.chunks(block_size) {
            let xored = utils::xor_blocks(chunk, &previous_block)?;
            let encrypted_block = cipher.encrypt(&xored)?;
            ciphertext.extend(&encrypted_block);
            previous_block = encrypted_block;
        }

        Ok(ciphertext)
    }

    /// CBC mode decryption
    ///
    /// P_i = D(K, C_i) ⊕ C_{i-1}
    pub fn cbc_decrypt<C: BlockCipher + ?Sized>(cipher: &C, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        let block_size = cipher.block_size();
        Self::validate_block_size(block_size)?;
        Self::validate_iv_length(iv, block_size)?;
        Self::validate_ciphertext_length(ciphertext, block_size)?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        let mut previous_block = iv;

        for chunk in ciphertext.chunks(block_size) {
            let decrypted_block = cipher.decrypt(chunk)?;
            let xored = utils::xor_blocks(&decrypted_block, previous_block)?;
            plaintext.extend(xored);
            previous_block = chunk;
        }

        utils::remove_padding(&plaintext, block_size)
    }
}
