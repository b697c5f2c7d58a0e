//! Request and response payloads
//!
//! Field names follow the JSON contract of the lab front end (`keyHex`,
//! `ciphertextBase64`, `allCandidates`, ...). Optional response fields are
//! omitted when absent.

use std::collections::BTreeMap;

use cipher_modes::Mode;
use classical::{Algorithm, LetterStat, SubstitutionMapping};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LabError, Result};

fn from_str_field<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr<Err = String>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

fn optional_from_str_field<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr<Err = String>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Block cipher encryption of a UTF-8 plaintext.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEncryptRequest {
    pub plaintext: String,
    pub key_hex: String,
    /// `"CBC"` or `"ECB"`, any case
    #[serde(deserialize_with = "from_str_field")]
    pub mode: Mode,
    #[serde(default)]
    pub iv_hex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockEncryptResponse {
    pub ciphertext_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciphertext_base64: Option<String>,
    /// CBC only: the IV that was used, generated when none was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv_base64: Option<String>,
}

/// Block cipher decryption. The ciphertext comes as hex or base64; hex wins
/// when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDecryptRequest {
    #[serde(default)]
    pub ciphertext_hex: Option<String>,
    #[serde(default)]
    pub ciphertext_base64: Option<String>,
    pub key_hex: String,
    #[serde(deserialize_with = "from_str_field")]
    pub mode: Mode,
    #[serde(default)]
    pub iv_hex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockDecryptResponse {
    /// Lossy UTF-8 view of the plaintext bytes
    pub plaintext_utf8: String,
    pub plaintext_hex: String,
    pub plaintext_base64: String,
}

/// Any request that carries only a ciphertext.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiphertextRequest {
    pub ciphertext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaesarCandidateWire {
    pub k: u8,
    pub pt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaesarResponse {
    pub key: u8,
    pub plaintext: String,
    pub best_score: f64,
    pub all_candidates: Vec<CaesarCandidateWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VigenereCandidateWire {
    pub key: String,
    pub key_len: usize,
    pub score: f64,
    pub plaintext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VigenereResponse {
    pub key: String,
    pub key_len: usize,
    pub plaintext: String,
    pub all_rotations: Vec<String>,
    pub candidates: Vec<VigenereCandidateWire>,
}

/// A substitution mapping on the wire: either 26 plain letters aligned to
/// cipher letters a..z, or an explicit `{"a": "q", ...}` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MappingWire {
    Array(Vec<String>),
    Table(BTreeMap<String, String>),
}

fn single_letter(entry: &str) -> Result<char> {
    let mut chars = entry.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(classical::AnalysisError::InvalidMapping(format!("{entry:?} is not a single letter")).into()),
    }
}

impl MappingWire {
    /// The 26-entry array form.
    pub fn array(mapping: &SubstitutionMapping) -> Self {
        MappingWire::Array(mapping.plain_letters().iter().map(char::to_string).collect())
    }

    /// The `cipher -> plain` table form.
    pub fn table(mapping: &SubstitutionMapping) -> Self {
        MappingWire::Table(
            mapping
                .pairs()
                .map(|(cipher, plain)| (cipher.to_string(), plain.to_string()))
                .collect(),
        )
    }

    /// Validates the wire form into a bijective mapping.
    pub fn to_mapping(&self) -> Result<SubstitutionMapping> {
        let mapping = match self {
            MappingWire::Array(entries) => {
                let letters = entries.iter().map(|e| single_letter(e)).collect::<Result<Vec<char>>>()?;
                SubstitutionMapping::from_letters(letters)?
            }
            MappingWire::Table(table) => {
                let pairs = table
                    .iter()
                    .map(|(cipher, plain)| Ok((single_letter(cipher)?, single_letter(plain)?)))
                    .collect::<Result<Vec<(char, char)>>>()?;
                SubstitutionMapping::from_pairs(pairs)?
            }
        };
        Ok(mapping)
    }
}

impl From<&SubstitutionMapping> for MappingWire {
    fn from(mapping: &SubstitutionMapping) -> Self {
        MappingWire::table(mapping)
    }
}

impl TryFrom<&MappingWire> for SubstitutionMapping {
    type Error = LabError;

    fn try_from(wire: &MappingWire) -> Result<Self> {
        wire.to_mapping()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMappingRequest {
    pub ciphertext: String,
    pub mapping: MappingWire,
}

/// Automatic substitution solve. Parameters left out fall back to the lab
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSolveRequest {
    pub ciphertext: String,
    #[serde(default, deserialize_with = "optional_from_str_field")]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub restarts: Option<usize>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub initial_temp: Option<f64>,
    #[serde(default)]
    pub cooling_rate: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MappingResponse {
    pub mapping: MappingWire,
    pub plaintext: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMappingResponse {
    pub plaintext: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterStatWire {
    pub letter: String,
    pub count: u32,
    /// Percentage with two decimals, e.g. `"12.34%"`
    pub frequency: String,
}

impl From<&LetterStat> for LetterStatWire {
    fn from(stat: &LetterStat) -> Self {
        Self {
            letter: stat.letter.to_string(),
            count: stat.count,
            frequency: stat.percent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeygenRequest {
    /// `des`, `aes128`, `aes192` or `aes256`
    pub cipher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeygenResponse {
    pub key_hex: String,
}
