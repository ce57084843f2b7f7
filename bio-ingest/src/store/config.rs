//! Vector store configuration.

use std::str::FromStr;

use crate::errors::StoreError;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION_PREFIX: &str = "biorag";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Qdrant over gRPC, one collection per embedding space.
    Qdrant,
    /// In-process vectors, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(StoreError::Config(format!(
                "VECTOR_STORE must be 'qdrant' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Qdrant gRPC endpoint.
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    /// Collection names are `<prefix>_<space>`.
    pub collection_prefix: String,
    /// Points per upsert request.
    pub upsert_batch: usize,
    /// Exact search instead of HNSW.
    pub exact_search: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Qdrant,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
            upsert_batch: 256,
            exact_search: false,
        }
    }
}

impl StoreConfig {
    /// Reads `VECTOR_STORE`, `QDRANT_URL`, `QDRANT_API_KEY`,
    /// `QDRANT_COLLECTION` and `QDRANT_EXACT_SEARCH`.
    pub fn from_env() -> Result<Self, StoreError> {
        let mut cfg = Self::default();
        if let Some(v) = var("VECTOR_STORE") {
            cfg.backend = v.parse()?;
        }
        if let Some(v) = var("QDRANT_URL") {
            cfg.qdrant_url = v;
        }
        cfg.qdrant_api_key = var("QDRANT_API_KEY");
        if let Some(v) = var("QDRANT_COLLECTION") {
            cfg.collection_prefix = v;
        }
        if let Some(v) = var("QDRANT_EXACT_SEARCH") {
            cfg.exact_search = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.backend == StoreBackend::Memory {
            return Ok(());
        }
        if !(self.qdrant_url.starts_with("http://") || self.qdrant_url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "QDRANT_URL must start with http:// or https://, got '{}'",
                self.qdrant_url
            )));
        }
        if self.collection_prefix.trim().is_empty() {
            return Err(StoreError::Config("QDRANT_COLLECTION is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(StoreError::Config("upsert batch must be > 0".into()));
        }
        Ok(())
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
