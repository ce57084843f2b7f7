//! Embedding layer for BioRAG.
//!
//! - [`EmbeddingsProvider`]: async provider trait shared by every backend
//! - [`OllamaEmbedder`]: default model served by Ollama
//! - [`BioEmbedding`]: biomedical model selected by name (Ollama or ONNX)
//! - [`EmbeddingRegistry`]: loaded providers keyed by [`EmbeddingSelector`]

mod bio;
mod config;
mod errors;
mod hash_embedder;
mod ollama;
#[cfg(feature = "onnx")]
mod onnx;
mod provider;
mod registry;
mod selector;

pub use bio::BioEmbedding;
pub use config::{
    BioBackend, BioEmbeddingConfig, DEFAULT_BIO_MODEL, DEFAULT_LOAD_TIMEOUT_SECS, EmbeddingMode,
};
pub use errors::EmbeddingError;
pub use hash_embedder::HashEmbedder;
pub use ollama::OllamaEmbedder;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;
pub use provider::{EmbedFuture, EmbeddingsProvider};
pub use registry::{EmbeddingRegistry, SpaceInfo};
pub use selector::EmbeddingSelector;

/// Cosine similarity; `0.0` when either vector is zero or lengths differ.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}
