//! Shared LLM service with two active profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - Extra embedding models (e.g. a domain model) go through [`LlmServiceProfiles::embed_with`]
//!   and share the same client cache.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatMessage, LlmServiceProfiles};
//! use ai_llm_service::config::default_config::{config_ollama_chat, config_ollama_embedding};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(
//!     config_ollama_chat()?,
//!     config_ollama_embedding()?,
//!     Some(10),
//! )?);
//!
//! let answer = svc.chat(&[ChatMessage::user("Hello")]).await?;
//! let (_, embedding) = svc.profiles();
//! let emb = svc.embed_with(embedding, "Ferris").await?;
//! println!("{answer} / dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    chat_message::ChatMessage,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::ollama_service::OllamaService,
};

/// Shared service that manages the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service.
    ///
    /// - `chat`: profile used for chat completion.
    /// - `embedding`: default embedding profile.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Multi-turn chat completion using the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the upstream call fails.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        let cli = self.client_for(&self.chat).await?;
        Ok(cli.chat(messages).await?)
    }

    /// Embeds one text with an explicit embedding config.
    pub async fn embed_with(
        &self,
        cfg: &LlmModelConfig,
        input: &str,
    ) -> Result<Vec<f32>, AiLlmError> {
        let cli = self.client_for(cfg).await?;
        Ok(cli.embeddings(input).await?)
    }

    /// Embeds a batch with an explicit embedding config.
    pub async fn embed_many_with(
        &self,
        cfg: &LlmModelConfig,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>, AiLlmError> {
        let cli = self.client_for(cfg).await?;
        Ok(cli.embed_many(inputs).await?)
    }

    /// Probes the chat profile and, when it differs, the embedding profile.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![("chat", &self.chat)];
        if self.embedding != self.chat {
            list.push(("embedding", &self.embedding));
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn client_for(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>, AiLlmError> {
        match cfg.provider {
            LlmProvider::Ollama => self.get_or_init_ollama(cfg).await,
        }
    }

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let svc = LlmServiceProfiles::new(cfg("llama3.1:8b"), cfg("nomic-embed-text"), Some(1))
            .unwrap();

        let a = svc.client_for(&cfg("nomic-embed-text")).await.unwrap();
        let b = svc.client_for(&cfg("nomic-embed-text")).await.unwrap();
        let c = svc.client_for(&cfg("biobert")).await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(svc.ollama.read().await.len(), 2);
    }

    #[tokio::test]
    async fn bad_endpoint_is_an_error_not_a_panic() {
        let svc =
            LlmServiceProfiles::new(cfg("llama3.1:8b"), cfg("nomic-embed-text"), Some(1)).unwrap();
        let mut bad = cfg("x");
        bad.endpoint = "ftp://nowhere".into();
        let err = svc.embed_with(&bad, "text").await.unwrap_err();
        assert!(matches!(err, AiLlmError::Ollama(_)));
    }
}
