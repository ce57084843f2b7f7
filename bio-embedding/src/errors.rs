//! Error type shared by every embedding provider.

use std::{path::PathBuf, time::Duration};

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Invalid or unsupported configuration.
    #[error("embedding config error: {0}")]
    Config(String),

    /// A model name was required but blank.
    #[error("embedding model name must not be empty")]
    EmptyModelName,

    /// The backend was compiled out.
    #[error("embedding backend '{0}' is not enabled in this build")]
    BackendDisabled(&'static str),

    /// Model loading did not finish in time.
    #[error("loading embedding model '{model}' timed out after {timeout:?}")]
    LoadTimeout { model: String, timeout: Duration },

    /// A required model file is missing on disk.
    #[error("embedding model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// The model runtime refused to initialize.
    #[error("embedding model init failed: {0}")]
    ModelInit(String),

    /// Inference failed for a loaded model.
    #[error("embedding inference failed: {0}")]
    Inference(String),

    /// Upstream LLM runtime error (Ollama).
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    /// Vector length differs from the model's dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },
}
