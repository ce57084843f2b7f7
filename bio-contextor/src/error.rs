//! Typed error for the contextor crate.

use ai_llm_service::AiLlmError;
use bio_embedding::EmbeddingError;
use bio_ingest::StoreError;
use bio_metadata::ModeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// The conversation has no user message to answer.
    #[error("conversation has no user message")]
    EmptyConversation,

    /// `mode` outside the accepted set.
    #[error(transparent)]
    InvalidMode(#[from] ModeError),

    /// Query embedding failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Retrieval from the vector store failed.
    #[error("retrieval error: {0}")]
    Store(#[from] StoreError),

    /// Chat completion failed upstream.
    #[error("LLM error: {0}")]
    Llm(#[from] AiLlmError),
}
