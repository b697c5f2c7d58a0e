//! Request handlers
//!
//! [`Lab`] owns the configuration, the language models and the key/IV
//! randomness source. Each handler takes a decoded request and returns the
//! matching response; [`Lab::dispatch`] does the JSON decoding and encoding
//! around them for a named [`Endpoint`].

use std::fmt;
use std::str::FromStr;

use aes_cipher::{Aes, AesKeySize};
use cipher_modes::{codec, BlockCipher, CipherModes};
use classical::frequency::LetterStats;
use classical::{caesar, vigenere, NgramModel, Scorer, SubstitutionMapping, SubstitutionSolver, WordListScorer};
use des_cipher::Des;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::*;
use crate::config::LabConfig;
use crate::error::{LabError, Result};

/// Block cipher family behind the `/des/*` and `/aes/*` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAlgorithm {
    Des,
    /// Key size follows the key length
    Aes,
}

impl BlockAlgorithm {
    fn cipher(self, key: &[u8]) -> Result<Box<dyn BlockCipher>> {
        let cipher: Box<dyn BlockCipher> = match self {
            BlockAlgorithm::Des => Box::new(Des::new(key)?),
            BlockAlgorithm::Aes => Box::new(Aes::new(key)?),
        };
        Ok(cipher)
    }
}

impl fmt::Display for BlockAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockAlgorithm::Des => f.write_str("DES"),
            BlockAlgorithm::Aes => f.write_str("AES"),
        }
    }
}

/// Every operation the lab answers, named by its request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DesEncrypt,
    DesDecrypt,
    AesEncrypt,
    AesDecrypt,
    CaesarBruteforce,
    VigenereSolve,
    MonoStats,
    MonoInitMapping,
    MonoApplyMapping,
    MonoAutoSolve,
    Keygen,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::DesEncrypt,
        Endpoint::DesDecrypt,
        Endpoint::AesEncrypt,
        Endpoint::AesDecrypt,
        Endpoint::CaesarBruteforce,
        Endpoint::VigenereSolve,
        Endpoint::MonoStats,
        Endpoint::MonoInitMapping,
        Endpoint::MonoApplyMapping,
        Endpoint::MonoAutoSolve,
        Endpoint::Keygen,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DesEncrypt => "/des/encrypt",
            Endpoint::DesDecrypt => "/des/decrypt",
            Endpoint::AesEncrypt => "/aes/encrypt",
            Endpoint::AesDecrypt => "/aes/decrypt",
            Endpoint::CaesarBruteforce => "/caesar/bruteforce",
            Endpoint::VigenereSolve => "/vigenere/solve",
            Endpoint::MonoStats => "/mono/stats",
            Endpoint::MonoInitMapping => "/mono/initMapping",
            Endpoint::MonoApplyMapping => "/mono/applyMapping",
            Endpoint::MonoAutoSolve => "/mono/autoSolve",
            Endpoint::Keygen => "/keygen",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    /// Accepts the path with or without the leading slash.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/');
        Endpoint::ALL
            .into_iter()
            .find(|e| e.path()[1..].eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown endpoint: {s}"))
    }
}

fn decode_optional_hex(field: &Option<String>) -> Result<Option<Vec<u8>>> {
    Ok(match field {
        Some(text) => Some(codec::from_hex(text)?),
        None => None,
    })
}

/// The cipher lab: every handler of the wire contract behind one value.
pub struct Lab<R = OsRng> {
    config: LabConfig,
    model: NgramModel,
    words: WordListScorer,
    rng: R,
}

impl Lab<OsRng> {
    /// A lab drawing keys and IVs from the operating system.
    pub fn new(config: LabConfig) -> Result<Self> {
        Self::with_rng(config, OsRng)
    }
}

impl<R: RngCore + CryptoRng> Lab<R> {
    /// A lab drawing keys and IVs from `rng`.
    pub fn with_rng(config: LabConfig, rng: R) -> Result<Self> {
        let model = config.load_model()?;
        Ok(Self {
            config,
            model,
            words: WordListScorer::english(),
            rng,
        })
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn model(&self) -> &NgramModel {
        &self.model
    }

    /// Encrypts the UTF-8 plaintext. CBC without `ivHex` draws a fresh IV.
    pub fn block_encrypt(&mut self, algorithm: BlockAlgorithm, req: &BlockEncryptRequest) -> Result<BlockEncryptResponse> {
        let key = codec::from_hex(&req.key_hex)?;
        let iv = decode_optional_hex(&req.iv_hex)?;
        let cipher = algorithm.cipher(&key)?;

        let out = CipherModes::encrypt(&cipher, req.plaintext.as_bytes(), req.mode, iv.as_deref(), &mut self.rng)?;
        debug!(%algorithm, mode = %req.mode, len = out.ciphertext.len(), "block encrypt");

        Ok(BlockEncryptResponse {
            ciphertext_hex: codec::to_hex(&out.ciphertext),
            ciphertext_base64: Some(codec::to_base64(&out.ciphertext)),
            iv_hex: out.iv.as_deref().map(codec::to_hex),
            iv_base64: out.iv.as_deref().map(codec::to_base64),
        })
    }

    /// Decrypts hex or base64 ciphertext. Hex wins when both are given.
    pub fn block_decrypt(&self, algorithm: BlockAlgorithm, req: &BlockDecryptRequest) -> Result<BlockDecryptResponse> {
        let ciphertext = match (&req.ciphertext_hex, &req.ciphertext_base64) {
            (Some(hex), _) => codec::from_hex(hex)?,
            (None, Some(b64)) => codec::from_base64(b64)?,
            (None, None) => return Err(LabError::MissingCiphertext),
        };
        let key = codec::from_hex(&req.key_hex)?;
        let iv = decode_optional_hex(&req.iv_hex)?;
        let cipher = algorithm.cipher(&key)?;

        let plaintext = CipherModes::decrypt(&cipher, &ciphertext, req.mode, iv.as_deref())?;
        debug!(%algorithm, mode = %req.mode, len = plaintext.len(), "block decrypt");

        Ok(BlockDecryptResponse {
            plaintext_utf8: String::from_utf8_lossy(&plaintext).into_owned(),
            plaintext_hex: codec::to_hex(&plaintext),
            plaintext_base64: codec::to_base64(&plaintext),
        })
    }

    /// Brute force over the 26 shifts, ranked by common-word matches.
    pub fn caesar(&self, req: &CiphertextRequest) -> Result<CaesarResponse> {
        let solution = caesar::solve(&req.ciphertext, &self.words)?;
        Ok(CaesarResponse {
            key: solution.best.key,
            plaintext: solution.best.plaintext,
            best_score: solution.best.score,
            all_candidates: solution
                .candidates
                .into_iter()
                .map(|c| CaesarCandidateWire { k: c.key, pt: c.plaintext })
                .collect(),
        })
    }

    pub fn vigenere(&self, req: &CiphertextRequest) -> Result<VigenereResponse> {
        let solution = vigenere::solve(&req.ciphertext, &self.config.vigenere, &self.model)?;
        Ok(VigenereResponse {
            key: solution.key,
            key_len: solution.key_len,
            plaintext: solution.plaintext,
            all_rotations: solution.rotations,
            candidates: solution
                .candidates
                .into_iter()
                .map(|c| VigenereCandidateWire {
                    key: c.key,
                    key_len: c.key_len,
                    score: c.score,
                    plaintext: c.plaintext,
                })
                .collect(),
        })
    }

    /// Letter counts, most frequent first. Empty input gives an empty table.
    pub fn stats(&self, req: &CiphertextRequest) -> Vec<LetterStatWire> {
        let stats = LetterStats::from_text(&req.ciphertext);
        if stats.is_empty() {
            return Vec::new();
        }
        stats.table().iter().map(LetterStatWire::from).collect()
    }

    /// The frequency-seeded starting mapping and its decryption.
    pub fn init_mapping(&self, req: &CiphertextRequest) -> Result<MappingResponse> {
        if req.ciphertext.trim().is_empty() {
            return Err(classical::AnalysisError::EmptyInput.into());
        }
        let mapping = SubstitutionMapping::frequency_seeded(&req.ciphertext);
        Ok(self.mapping_response(&req.ciphertext, &mapping))
    }

    pub fn apply_mapping(&self, req: &ApplyMappingRequest) -> Result<ApplyMappingResponse> {
        let mapping = SubstitutionMapping::try_from(&req.mapping)?;
        let plaintext = mapping.apply(&req.ciphertext);
        Ok(ApplyMappingResponse {
            score: self.model.score(&plaintext),
            plaintext,
        })
    }

    /// Runs the substitution solver. Parameters missing from the request
    /// come from the lab configuration.
    pub fn auto_solve(&self, req: &AutoSolveRequest) -> Result<MappingResponse> {
        let mut config = self.config.solver.clone();
        if let Some(algorithm) = req.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(restarts) = req.restarts {
            config.restarts = restarts;
        }
        if let Some(iterations) = req.iterations {
            config.iterations = iterations;
        }
        if let Some(initial_temp) = req.initial_temp {
            config.initial_temp = initial_temp;
        }
        if let Some(cooling_rate) = req.cooling_rate {
            config.cooling_rate = cooling_rate;
        }
        if let Some(seed) = req.seed {
            config.seed = seed;
        }

        let outcome = SubstitutionSolver::new(&self.model, &config).solve(&req.ciphertext)?;
        if outcome.timed_out {
            warn!(completed = outcome.restarts_completed, "solver deadline reached, returning best so far");
        }

        Ok(MappingResponse {
            mapping: MappingWire::from(&outcome.mapping),
            plaintext: outcome.plaintext,
            score: outcome.score,
        })
    }

    /// A fresh random key for `des`, `aes128`, `aes192` or `aes256`.
    pub fn keygen(&mut self, req: &KeygenRequest) -> Result<KeygenResponse> {
        let key = match req.cipher.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "des" => Des::generate_key(&mut self.rng).to_vec(),
            "aes128" | "aes" => Aes::generate_key(AesKeySize::Aes128, &mut self.rng),
            "aes192" => Aes::generate_key(AesKeySize::Aes192, &mut self.rng),
            "aes256" => Aes::generate_key(AesKeySize::Aes256, &mut self.rng),
            _ => return Err(LabError::UnknownKeyType(req.cipher.clone())),
        };
        Ok(KeygenResponse { key_hex: codec::to_hex(&key) })
    }

    /// Decodes `body` as the request of `endpoint`, runs the handler and
    /// encodes the response.
    pub fn dispatch(&mut self, endpoint: Endpoint, body: &str) -> Result<String> {
        info!(%endpoint, bytes = body.len(), "handling request");

        match endpoint {
            Endpoint::DesEncrypt => self.block_encrypt(BlockAlgorithm::Des, &parse(body)?).and_then(render),
            Endpoint::AesEncrypt => self.block_encrypt(BlockAlgorithm::Aes, &parse(body)?).and_then(render),
            Endpoint::DesDecrypt => self.block_decrypt(BlockAlgorithm::Des, &parse(body)?).and_then(render),
            Endpoint::AesDecrypt => self.block_decrypt(BlockAlgorithm::Aes, &parse(body)?).and_then(render),
            Endpoint::CaesarBruteforce => self.caesar(&parse(body)?).and_then(render),
            Endpoint::VigenereSolve => self.vigenere(&parse(body)?).and_then(render),
            Endpoint::MonoStats => render(self.stats(&parse(body)?)),
            Endpoint::MonoInitMapping => self.init_mapping(&parse(body)?).and_then(render),
            Endpoint::MonoApplyMapping => self.apply_mapping(&parse(body)?).and_then(render),
            Endpoint::MonoAutoSolve => self.auto_solve(&parse(body)?).and_then(render),
            Endpoint::Keygen => self.keygen(&parse(body)?).and_then(render),
        }
    }

    /// Like [`Lab::dispatch`], with failures rendered as `{"error": ...}`.
    pub fn handle(&mut self, endpoint: Endpoint, body: &str) -> String {
        match self.dispatch(endpoint, body) {
            Ok(response) => response,
            Err(err) => {
                warn!(%endpoint, error = %err, "request failed");
                render_error(&err)
            }
        }
    }

    fn mapping_response(&self, ciphertext: &str, mapping: &SubstitutionMapping) -> MappingResponse {
        let plaintext = mapping.apply(ciphertext);
        MappingResponse {
            mapping: MappingWire::from(mapping),
            score: self.model.score(&plaintext),
            plaintext,
        }
    }
}

impl<R> fmt::Debug for Lab<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lab").field("config", &self.config).finish_non_exhaustive()
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

fn render<T: Serialize>(response: T) -> Result<String> {
    Ok(serde_json::to_string(&response)?)
}

/// The `{"error": ...}` body for a failed request.
pub fn render_error(err: &LabError) -> String {
    serde_json::to_string(&err.to_response()).unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn lab() -> Lab<ChaCha20Rng> {
        Lab::with_rng(LabConfig::default(), ChaCha20Rng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_endpoint_paths_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.path().parse::<Endpoint>().unwrap(), endpoint);
        }
        assert_eq!("mono/autosolve".parse::<Endpoint>().unwrap(), Endpoint::MonoAutoSolve);
        assert!("/des/sign".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_keygen_lengths() {
        let mut lab = lab();
        for (cipher, hex_len) in [("des", 16), ("aes128", 32), ("AES-192", 48), ("aes_256", 64)] {
            let resp = lab.keygen(&KeygenRequest { cipher: cipher.into() }).unwrap();
            assert_eq!(resp.key_hex.len(), hex_len, "{cipher}");
        }
        assert!(matches!(
            lab.keygen(&KeygenRequest { cipher: "rsa".into() }),
            Err(LabError::UnknownKeyType(_))
        ));
    }

    #[test]
    fn test_generated_keys_are_accepted() {
        let mut lab = lab();
        let key_hex = lab.keygen(&KeygenRequest { cipher: "aes256".into() }).unwrap().key_hex;
        let req = BlockEncryptRequest {
            plaintext: "generated".into(),
            key_hex,
            mode: cipher_modes::Mode::Ecb,
            iv_hex: None,
        };
        let resp = lab.block_encrypt(BlockAlgorithm::Aes, &req).unwrap();
        assert_eq!(resp.ciphertext_hex.len(), 32);
        assert!(resp.iv_hex.is_none());
    }

    #[test]
    fn test_decrypt_needs_ciphertext() {
        let lab = lab();
        let req = BlockDecryptRequest {
            ciphertext_hex: None,
            ciphertext_base64: None,
            key_hex: "133457799BBCDFF1".into(),
            mode: cipher_modes::Mode::Ecb,
            iv_hex: None,
        };
        assert!(matches!(
            lab.block_decrypt(BlockAlgorithm::Des, &req),
            Err(LabError::MissingCiphertext)
        ));
    }

    #[test]
    fn test_stats_of_empty_text() {
        let lab = lab();
        assert!(lab.stats(&CiphertextRequest { ciphertext: String::new() }).is_empty());
        assert!(lab.stats(&CiphertextRequest { ciphertext: "123 !".into() }).is_empty());

        let table = lab.stats(&CiphertextRequest { ciphertext: "abca".into() });
        assert_eq!(table.len(), 26);
        assert_eq!(table[0].letter, "a");
        assert_eq!(table[0].frequency, "50.00%");
    }

    #[test]
    fn test_handle_renders_errors() {
        let mut lab = lab();
        let body = lab.handle(Endpoint::MonoInitMapping, r#"{"ciphertext": "  "}"#);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["error"].as_str().unwrap().to_lowercase().contains("empty"));

        let body = lab.handle(Endpoint::CaesarBruteforce, "not json");
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["error"].is_string());
    }
}
