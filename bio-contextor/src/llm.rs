//! Chat completion backend seam.

use std::{future::Future, pin::Pin};

use ai_llm_service::{AiLlmError, ChatMessage, LlmServiceProfiles};

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;

/// Non-streaming chat completion.
pub trait ChatBackend: Send + Sync {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a>;
}

/// Uses the `chat` profile of the shared LLM service.
impl ChatBackend for LlmServiceProfiles {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatFuture<'a> {
        Box::pin(self.chat(messages))
    }
}
