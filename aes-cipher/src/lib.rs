//! AES implementation in Rust
//!
//! Implements AES encryption and decryption for 128, 192 and 256 bit keys
//! as specified in FIPS-197. The round count follows from the key length:
//! 10, 12 or 14 rounds respectively.

mod key_schedule;
mod state;
mod tables;

use std::fmt;

use cipher_modes::{BlockCipher, CipherModeError, Result};
use rand::{CryptoRng, RngCore};

use state::AesBlock;

/// Block size in bytes, fixed at 128 bits for every key size
pub const BLOCK_SIZE: usize = 16;

/// Supported AES key lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesKeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl AesKeySize {
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(AesKeySize::Aes128),
            24 => Some(AesKeySize::Aes192),
            32 => Some(AesKeySize::Aes256),
            _ => None,
        }
    }

    /// Key length in bytes
    pub fn key_len(self) -> usize {
        match self {
            AesKeySize::Aes128 => 16,
            AesKeySize::Aes192 => 24,
            AesKeySize::Aes256 => 32,
        }
    }

    pub fn rounds(self) -> usize {
        self.key_len() / 4 + 6
    }
}

impl fmt::Display for AesKeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES-{}", self.key_len() * 8)
    }
}

/// An AES instance with its expanded round keys.
#[derive(Clone)]
pub struct Aes {
    key_size: AesKeySize,
    round_keys: Vec<[u8; 16]>,
}

impl Aes {
    /// Creates an AES cipher from a 16, 24 or 32 byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key_size = AesKeySize::from_len(key.len()).ok_or(CipherModeError::InvalidKeyLength {
            expected: "16, 24 or 32",
            actual: key.len(),
        })?;

        Ok(Self {
            key_size,
            round_keys: key_schedule::expand_key(key),
        })
    }

    /// Draws a fresh key of the requested size from a cryptographically secure source.
    pub fn generate_key<R: RngCore + CryptoRng + ?Sized>(size: AesKeySize, rng: &mut R) -> Vec<u8> {
        let mut key = vec![0u8; size.key_len()];
        rng.fill_bytes(&mut key);
        key
    }

    pub fn key_size(&self) -> AesKeySize {
        self.key_size
    }

    /// AES encryption:
    /// 1. Initial round key addition
    /// 2. `rounds - 1` main rounds (SubBytes, ShiftRows, MixColumns, AddRoundKey)
    /// 3. Final round without MixColumns (SubBytes, ShiftRows, AddRoundKey)
    pub fn encrypt_block(&self, plaintext: &[u8; 16]) -> [u8; 16] {
        let rounds = self.key_size.rounds();
        let mut block = AesBlock::new(plaintext);

        block.add_round_key(&self.round_keys[0]);

        for round_key in &self.round_keys[1..rounds] {
            block.sub_bytes();
            block.shift_rows();
            block.mix_columns();
            block.add_round_key(round_key);
        }

        block.sub_bytes();
        block.shift_rows();
        block.add_round_key(&self.round_keys[rounds]);

        block.to_bytes()
    }

    /// AES decryption, the inverse transformations in reverse order:
    /// 1. Initial round key addition (with the last round key)
    /// 2. `rounds - 1` main rounds (InvShiftRows, InvSubBytes, AddRoundKey, InvMixColumns)
    /// 3. Final round without InvMixColumns (InvShiftRows, InvSubBytes, AddRoundKey)
    pub fn decrypt_block(&self, ciphertext: &[u8; 16]) -> [u8; 16] {
        let rounds = self.key_size.rounds();
        let mut block = AesBlock::new(ciphertext);

        block.add_round_key(&self.round_keys[rounds]);

        for round_key in self.round_keys[1..rounds].iter().rev() {
            block.inv_shift_rows();
            block.inv_sub_bytes();
            block.add_round_key(round_key);
            block.inv_mix_columns();
        }

        block.inv_shift_rows();
        block.inv_sub_bytes();
        block.add_round_key(&self.round_keys[0]);

        block.to_bytes()
    }
}

impl fmt::Debug for Aes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes").field("key_size", &self.key_size).finish_non_exhaustive()
    }
}

fn as_block(block: &[u8]) -> Result<&[u8; 16]> {
    block.try_into().map_err(|_| CipherModeError::InvalidBlockSize)
}

impl BlockCipher for Aes {
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        Ok(self.encrypt_block(as_block(block)?).to_vec())
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        Ok(self.decrypt_block(as_block(block)?).to_vec())
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}
