//! Generic block cipher trait

use crate::error::Result;

/// Trait for a keyed block cipher.
///
/// Implementors run their key schedule once at construction and then
/// transform single blocks of exactly `block_size()` bytes.
pub trait BlockCipher {
    /// Encrypts a single block
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts a single block
    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>>;

    /// Returns the block size of the cipher in bytes
    fn block_size(&self) -> usize;
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt(block)
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(block)
    }

    fn block_size(&self) -> usize {
        (**self).block_size()
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for Box<C> {
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt(block)
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(block)
    }

    fn block_size(&self) -> usize {
        (**self).block_size()
    }
}
