//! Lab-wide settings shared by every request

use std::path::PathBuf;

use classical::{NgramModel, SolverConfig, VigenereConfig};
use tracing::info;

use crate::error::Result;

/// Defaults for the analyzers plus the source of the n-gram model.
#[derive(Debug, Clone, Default)]
pub struct LabConfig {
    /// Fallback parameters for `autoSolve` requests
    pub solver: SolverConfig,
    pub vigenere: VigenereConfig,
    /// Directory holding `english_{mono,bi,tri,quad}grams.txt`. The built-in
    /// sample model is used when unset.
    pub ngram_dir: Option<PathBuf>,
}

impl LabConfig {
    /// Loads the n-gram model this configuration points at.
    pub fn load_model(&self) -> Result<NgramModel> {
        let model = match &self.ngram_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "loading n-gram tables");
                NgramModel::from_dir(dir)?
            }
            None => NgramModel::english()?,
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabError;

    #[test]
    fn test_default_uses_builtin_model() {
        let config = LabConfig::default();
        assert!(config.ngram_dir.is_none());
        assert!(config.load_model().is_ok());
    }

    #[test]
    fn test_missing_ngram_dir_is_an_error() {
        let config = LabConfig {
            ngram_dir: Some(PathBuf::from("/nonexistent/cipher-lab-ngrams")),
            ..LabConfig::default()
        };
        assert!(matches!(config.load_model(), Err(LabError::Analysis(_))));
    }
}
