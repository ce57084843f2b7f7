//! Public API types re-used by external crates (e.g., the HTTP API layer).

use bio_metadata::Mode;
use serde::Serialize;

/// Per-request options.
#[derive(Clone, Debug)]
pub struct ChatOptions {
    /// Retrieve context from the document store before answering.
    pub use_context: bool,
    /// Overrides `RAG_TOP_K` when set.
    pub top_k: Option<usize>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            use_context: true,
            top_k: None,
        }
    }
}

/// A context chunk that was fed to the model.
#[derive(Clone, Debug, Serialize)]
pub struct UsedChunk {
    pub id: String,
    pub score: f32,
    pub file_name: Option<String>,
    pub document_type: Option<String>,
    pub text: String,
}

/// Final answer together with the context passed to the model.
#[derive(Clone, Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub mode: Option<Mode>,
    pub sources: Vec<UsedChunk>,
}
