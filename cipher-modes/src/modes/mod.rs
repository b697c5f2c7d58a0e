//! Cipher modes implementation

pub mod cbc;
pub mod ecb;

use std::fmt;
use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::error::{CipherModeError, Result};
use crate::BlockCipher;

/// Main struct for cipher modes
pub struct CipherModes;

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Electronic Code Book: every block encrypted independently, no IV.
    Ecb,
    /// Cipher Block Chaining: each block XORed with the previous ciphertext block.
    Cbc,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
        }
    }

    pub fn requires_iv(&self) -> bool {
        matches!(self, Mode::Cbc)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ECB" => Ok(Mode::Ecb),
            "CBC" => Ok(Mode::Cbc),
            other => Err(format!("unsupported mode: {other}")),
        }
    }
}

/// Output of an encryption: the ciphertext and, for CBC, the IV that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encrypted {
    pub ciphertext: Vec<u8>,
    pub iv: Option<Vec<u8>>,
}

impl CipherModes {
    /// Pad and encrypt `plaintext` under `mode`.
    ///
    /// ECB ignores `iv`. CBC uses the supplied IV or draws a fresh one from
    /// `rng` and hands it back in [`Encrypted::iv`].
    pub fn encrypt<C, R>(
        cipher: &C,
        plaintext: &[u8],
        mode: Mode,
        iv: Option<&[u8]>,
        rng: &mut R,
    ) -> Result<Encrypted>
    where
        C: BlockCipher + ?Sized,
        R: RngCore + CryptoRng + ?Sized,
    {
        debug!(%mode, len = plaintext.len(), block_size = cipher.block_size(), "encrypting");

        match mode {
            Mode::Ecb => Ok(Encrypted {
                ciphertext: Self::ecb_encrypt(cipher, plaintext)?,
                iv: None,
            }),
            Mode::Cbc => {
                let iv = match iv {
                    Some(iv) => iv.to_vec(),
                    None => Self::generate_iv(cipher.block_size(), rng),
                };
                let ciphertext = Self::cbc_encrypt(cipher, plaintext, &iv)?;
                Ok(Encrypted { ciphertext, iv: Some(iv) })
            }
        }
    }

    /// Decrypt and unpad `ciphertext` under `mode`. CBC fails with
    /// [`CipherModeError::MissingIv`] when no IV is given.
    pub fn decrypt<C>(cipher: &C, ciphertext: &[u8], mode: Mode, iv: Option<&[u8]>) -> Result<Vec<u8>>
    where
        C: BlockCipher + ?Sized,
    {
        debug!(%mode, len = ciphertext.len(), block_size = cipher.block_size(), "decrypting");

        match mode {
            Mode::Ecb => Self::ecb_decrypt(cipher, ciphertext),
            Mode::Cbc => {
                let iv = iv.ok_or(CipherModeError::MissingIv)?;
                Self::cbc_decrypt(cipher, ciphertext, iv)
            }
        }
    }

    /// Fresh random IV of `block_size` bytes.
    pub fn generate_iv<R: RngCore + CryptoRng + ?Sized>(block_size: usize, rng: &mut R) -> Vec<u8> {
        let mut iv = vec![0u8; block_size];
        rng.fill_bytes(&mut iv);
        iv
    }

    /// Validate block size
    pub fn validate_block_size(block_size: usize) -> Result<()> {
        if block_size == 0 || block_size > u8::MAX as usize {
            Err(CipherModeError::InvalidBlockSize)
        } else {
            Ok(())
        }
    }

    /// Validate IV length for modes that require it
    pub fn validate_iv_length(iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            Err(CipherModeError::InvalidIvLength {
                expected: block_size,
                actual: iv.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Ciphertext handed to a decryptor must be a non-empty run of whole blocks.
    pub(crate) fn validate_ciphertext_length(ciphertext: &[u8], block_size: usize) -> Result<()> {
        if ciphertext.is_empty() || ciphertext.len() % block_size != 0 {
            Err(CipherModeError::PaddingError)
        } else {
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::XorCipher;
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("cbc".parse::<Mode>().unwrap(), Mode::Cbc);
        assert_eq!(" ECB ".parse::<Mode>().unwrap(), Mode::Ecb);
        assert!("OFB".parse::<Mode>().is_err());
        assert_eq!(Mode::Cbc.to_string(), "CBC");
    }

    #[test]
    fn test_cbc_generates_iv_when_absent() {
        let cipher = XorCipher::new(b"testkey1");
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        let out = CipherModes::encrypt(&cipher, b"hello", Mode::Cbc, None, &mut rng).unwrap();
        let iv = out.iv.clone().unwrap();
        assert_eq!(iv.len(), 8);

        let back = CipherModes::decrypt(&cipher, &out.ciphertext, Mode::Cbc, Some(iv.as_slice())).unwrap();
        assert_eq!(back, b"hello");
    }

    #[test]
    fn test_ecb_returns_no_iv() {
        let cipher = XorCipher::new(b"testkey1");
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        let out = CipherModes::encrypt(&cipher, b"hello", Mode::Ecb, Some(&b"ignored!"[..]), &mut rng).unwrap();
        assert!(out.iv.is_none());
        assert_eq!(out.ciphertext.len(), 8);
    }

    #[test]
    fn test_cbc_decrypt_without_iv() {
        let cipher = XorCipher::new(b"testkey1");
        let result = CipherModes::decrypt(&cipher, &[0u8; 8], Mode::Cbc, None);
        assert_eq!(result, Err(CipherModeError::MissingIv));
    }

    #[test]
    fn test_validation_functions() {
        assert!(CipherModes::validate_block_size(16).is_ok());
        assert!(matches!(
            CipherModes::validate_block_size(0),
            Err(CipherModeError::InvalidBlockSize)
        ));

        let iv = vec![0u8; 16];
        assert!(CipherModes::validate_iv_length(&iv, 16).is_ok());

        let iv = vec![0u8; 8];
        assert_eq!(
            CipherModes::validate_iv_length(&iv, 16),
            Err(CipherModeError::InvalidIvLength { expected: 16, actual: 8 })
        );
    }
}
