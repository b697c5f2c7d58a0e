//! # Cipher Modes Library
//!
//! Block cipher modes of operation, PKCS#7 padding and the hex/base64
//! codecs used at the edges of the cipher lab.
//!
//! ## Supported Modes
//!
//! - **ECB** (Electronic Code Book) - Simple but insecure mode
//! - **CBC** (Cipher Block Chaining) - Widely used, requires IV
//!
//! ## Usage
//!
//! Any type implementing [`BlockCipher`] (the DES and AES engines in this
//! workspace do) can be driven through [`CipherModes`]:
//!
//! ```rust,ignore
//! use cipher_modes::{CipherModes, Mode};
//! use rand::rngs::OsRng;
//!
//! let cipher = aes_cipher::Aes::new(b"my-secret-key-16")?;
//! let out = CipherModes::encrypt(&cipher, b"Hello, World!", Mode::Cbc, None, &mut OsRng)?;
//! let back = CipherModes::decrypt(&cipher, &out.ciphertext, Mode::Cbc, out.iv.as_deref())?;
//! ```

// Public modules
pub mod cipher;
pub mod codec;
pub mod error;
pub mod modes;
pub mod utils;

// Re-exports for easy access
pub use cipher::BlockCipher;
pub use error::{CipherModeError, Result};
pub use modes::{CipherModes, Encrypted, Mode};
