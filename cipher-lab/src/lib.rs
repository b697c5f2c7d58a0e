//! # Cipher lab
//!
//! The JSON boundary of the lab. Requests and responses use the field names
//! of the lab front end (`keyHex`, `allCandidates`, ...); [`Lab`] answers
//! them with the DES/AES engines from `des-cipher` and `aes-cipher`, the
//! ECB/CBC layer from `cipher-modes` and the analyzers from `classical`.
//!
//! ```rust,ignore
//! use cipher_lab::{Endpoint, Lab, LabConfig};
//!
//! let mut lab = Lab::new(LabConfig::default())?;
//! let body = lab.dispatch(Endpoint::CaesarBruteforce, r#"{"ciphertext": "Wkh txlfn eurzq ira"}"#)?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod lab;

pub use config::LabConfig;
pub use error::{LabError, Result};
pub use lab::{render_error, BlockAlgorithm, Endpoint, Lab};
