//! Error types for ingestion and storage.

use std::path::PathBuf;

use bio_embedding::{EmbeddingError, EmbeddingSelector};
use thiserror::Error;

/// Failures of the base (format-level) ingestion pipeline.
#[derive(Debug, Error)]
pub enum BaseIngestionError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ingestion input: {0}")]
    InvalidInput(String),
}

/// Errors raised by a [`crate::VectorStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector store config error: {0}")]
    Config(String),

    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// A point payload could not be built or read back as a document.
    #[error("invalid point payload: {0}")]
    Payload(String),

    #[error("vector size mismatch in space '{space}': got {got}, want {want}")]
    VectorSizeMismatch {
        space: EmbeddingSelector,
        got: usize,
        want: usize,
    },

    #[error("document '{0}' has no vector for space '{1}'")]
    MissingVector(String, EmbeddingSelector),
}

/// Top-level ingestion error.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Base pipeline failure, propagated unchanged.
    #[error(transparent)]
    Base(#[from] BaseIngestionError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
