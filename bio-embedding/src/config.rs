//! Embedding configuration loaded from environment variables.
//!
//! - `EMBEDDING_MODE`                  = `default` | `bio` (default: `default`)
//! - `BIO_EMBEDDING_MODEL`             = model name (default: `dmis-lab/biobert-v1.1`)
//! - `BIO_EMBEDDING_CACHE`             = folder holding downloaded/exported models
//! - `BIO_EMBEDDING_BACKEND`           = `ollama` | `onnx` (default: `ollama`)
//! - `BIO_EMBEDDING_LOAD_TIMEOUT_SECS` = load + probe timeout (default: 60)

use std::{path::PathBuf, str::FromStr, time::Duration};

use ai_llm_service::error_handler::env_opt;

use crate::errors::EmbeddingError;

pub const DEFAULT_BIO_MODEL: &str = "dmis-lab/biobert-v1.1";
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 60;

/// Whether the biomedical embedding model is loaded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingMode {
    #[default]
    Default,
    Bio,
}

impl FromStr for EmbeddingMode {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(EmbeddingMode::Default),
            "bio" => Ok(EmbeddingMode::Bio),
            other => Err(EmbeddingError::Config(format!(
                "EMBEDDING_MODE must be 'default' or 'bio', got '{other}'"
            ))),
        }
    }
}

impl EmbeddingMode {
    pub fn from_env() -> Result<Self, EmbeddingError> {
        std::env::var("EMBEDDING_MODE")
            .unwrap_or_default()
            .parse()
    }
}

/// Runtime used to compute biomedical embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BioBackend {
    /// Model served by the Ollama runtime, addressed by name.
    #[default]
    Ollama,
    /// Local ONNX export (requires the `onnx` feature).
    Onnx,
}

impl FromStr for BioBackend {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "ollama" => Ok(BioBackend::Ollama),
            "onnx" => Ok(BioBackend::Onnx),
            other => Err(EmbeddingError::Config(format!(
                "BIO_EMBEDDING_BACKEND must be 'ollama' or 'onnx', got '{other}'"
            ))),
        }
    }
}

/// Settings for [`crate::BioEmbedding::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct BioEmbeddingConfig {
    pub model_name: String,
    pub cache_folder: Option<PathBuf>,
    pub backend: BioBackend,
    pub load_timeout_secs: u64,
}

impl Default for BioEmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_BIO_MODEL.to_string(),
            cache_folder: None,
            backend: BioBackend::Ollama,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl BioEmbeddingConfig {
    /// Reads the `BIO_EMBEDDING_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, EmbeddingError> {
        let model_name = std::env::var("BIO_EMBEDDING_MODEL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIO_MODEL.to_string());

        let cache_folder = std::env::var("BIO_EMBEDDING_CACHE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let backend = std::env::var("BIO_EMBEDDING_BACKEND")
            .unwrap_or_default()
            .parse()?;

        let load_timeout_secs = env_opt::<u64>("BIO_EMBEDDING_LOAD_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS);

        Ok(Self {
            model_name,
            cache_folder,
            backend,
            load_timeout_secs,
        })
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs.max(1))
    }

    /// Directory of a local model export: `<cache>/<model name with '/' → "--">`.
    pub fn model_dir(&self) -> PathBuf {
        let folder = self
            .cache_folder
            .clone()
            .unwrap_or_else(|| PathBuf::from("models"));
        folder.join(self.model_name.replace('/', "--"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("bio".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Bio);
        assert_eq!(" Default ".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Default);
        assert_eq!("".parse::<EmbeddingMode>().unwrap(), EmbeddingMode::Default);
        assert!("biobert".parse::<EmbeddingMode>().is_err());
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("onnx".parse::<BioBackend>().unwrap(), BioBackend::Onnx);
        assert_eq!("OLLAMA".parse::<BioBackend>().unwrap(), BioBackend::Ollama);
        assert!("torch".parse::<BioBackend>().is_err());
    }

    #[test]
    fn model_dir_flattens_namespace() {
        let cfg = BioEmbeddingConfig {
            cache_folder: Some(PathBuf::from("/var/cache/bio")),
            ..BioEmbeddingConfig::default()
        };
        assert_eq!(
            cfg.model_dir(),
            PathBuf::from("/var/cache/bio/dmis-lab--biobert-v1.1")
        );
    }

    #[test]
    fn default_points_at_biobert() {
        let cfg = BioEmbeddingConfig::default();
        assert_eq!(cfg.model_name, "dmis-lab/biobert-v1.1");
        assert_eq!(cfg.load_timeout(), Duration::from_secs(60));
    }
}
