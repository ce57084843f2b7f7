//! Shared LLM access for the BioRAG backend.
//!
//! - [`config`]: provider/model configuration and env-driven defaults
//! - [`services::ollama_service`]: thin Ollama client (chat, embeddings)
//! - [`service_profiles`]: `chat` + `embedding` profiles shared through `Arc`
//! - [`health_service`]: provider probes for `/health` and startup checks
//! - [`telemetry`]: tracing layer and filter helpers for the binary

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod services {
    pub mod ollama_service;
}

pub mod chat_message;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod telemetry;

pub use chat_message::{ChatMessage, MessageRole};
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, ConfigError, HealthError};
pub use service_profiles::LlmServiceProfiles;
