//! Mode-aware RAG chat.

use std::sync::Arc;

use ai_llm_service::ChatMessage;
use bio_embedding::EmbeddingRegistry;
use bio_ingest::{DOCUMENT_TYPE_KEY, FILE_NAME_KEY, VectorStore};
use bio_metadata::Mode;
use tracing::{debug, info};

use crate::{
    api_types::{ChatAnswer, ChatOptions, UsedChunk},
    cfg::ContextorConfig,
    dispatch::ModeDispatcher,
    error::ContextorError,
    llm::ChatBackend,
    prompt::build_context,
    templates::question_index,
};

/// Max characters of a source chunk echoed back to callers.
const SOURCE_PREVIEW_CHARS: usize = 800;

/// Answers chat requests: resolve mode, retrieve from the matching embedding
/// space, format with the mode's template, complete.
#[derive(Clone)]
pub struct ChatService {
    backend: Arc<dyn ChatBackend>,
    registry: EmbeddingRegistry,
    store: Arc<dyn VectorStore>,
    dispatcher: ModeDispatcher,
    cfg: ContextorConfig,
}

impl ChatService {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        registry: EmbeddingRegistry,
        store: Arc<dyn VectorStore>,
        cfg: ContextorConfig,
    ) -> Self {
        let dispatcher = ModeDispatcher::new(registry.has_bio());
        Self {
            backend,
            registry,
            store,
            dispatcher,
            cfg,
        }
    }

    pub fn dispatcher(&self) -> ModeDispatcher {
        self.dispatcher
    }

    /// # Errors
    /// - [`ContextorError::EmptyConversation`] without a user message
    /// - [`ContextorError::Embedding`] if the question cannot be embedded
    /// - [`ContextorError::Store`] if retrieval fails
    /// - [`ContextorError::Llm`] if the completion fails
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        mode: Option<Mode>,
        opts: &ChatOptions,
    ) -> Result<ChatAnswer, ContextorError> {
        let question = question_index(messages)
            .map(|i| messages[i].content.as_str())
            .ok_or(ContextorError::EmptyConversation)?;

        let resolution = self.dispatcher.resolve(mode);
        debug!(
            mode = ?resolution.mode,
            template = resolution.template.name,
            embedding = ?resolution.embedding,
            "mode resolved"
        );

        let mut sources = Vec::new();
        let mut context = None;

        if opts.use_context {
            let (space, provider) = self.registry.select(resolution.embedding);
            let query = provider.embed_query(question).await?;
            let k = opts.top_k.unwrap_or(self.cfg.top_k).max(1);
            let hits = self.store.search(space, &query, k).await?;

            info!(space = %space, hits = hits.len(), "context retrieved");
            if !hits.is_empty() {
                context = Some(build_context(&hits, self.cfg.max_ctx_chars));
            }
            sources = hits
                .iter()
                .map(|h| UsedChunk {
                    id: h.document.id.clone(),
                    score: h.score,
                    file_name: h.document.metadata.get(FILE_NAME_KEY).cloned(),
                    document_type: h.document.metadata.get(DOCUMENT_TYPE_KEY).cloned(),
                    text: h.document.text.chars().take(SOURCE_PREVIEW_CHARS).collect(),
                })
                .collect();
        }

        let formatted = resolution
            .template
            .format_messages(messages, context.as_deref());
        let answer = self.backend.complete(&formatted).await?;

        Ok(ChatAnswer {
            answer,
            mode: resolution.mode,
            sources,
        })
    }
}
