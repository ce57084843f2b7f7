use ai_llm_service::ChatMessage;
use bio_contextor::UsedChunk;
use bio_metadata::Mode;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /v1/chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Retrieve context before answering (default `true`).
    #[serde(default)]
    pub use_context: Option<bool>,
    /// Echo the retrieved chunks back in the response (default `false`).
    #[serde(default)]
    pub include_sources: Option<bool>,
    /// One of `clinical`, `moa`, `protein`, `regulatory`; absent or `null`
    /// keeps the general-purpose path.
    #[serde(default)]
    pub mode: Option<String>,
    /// Overrides `RAG_TOP_K` for this request.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Response payload for `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub answer: String,
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<UsedChunk>>,
}
