//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], grouped by role:
//!
//! - **Chat**      → answers chat requests (templated, RAG-augmented)
//! - **Embedding** → default embedding generator for retrieval
//! - **Bio embedding** → a named domain model served by the same runtime
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`       = provider kind (only `ollama` is accepted)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = chat model (mandatory)
//! - `EMBEDDING_MODEL`             = default embedding model (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt, must_env, validate_http_endpoint},
};

/// Resolves the provider from `LLM_KIND` (defaults to Ollama when unset).
///
/// # Errors
/// [`ConfigError::UnsupportedProvider`] for any other value.
pub fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match std::env::var("LLM_KIND") {
        Ok(v) if !v.trim().is_empty() => Ok(v.parse::<LlmProvider>()?),
        _ => Ok(LlmProvider::Ollama),
    }
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http(s) scheme
pub fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            validate_http_endpoint("OLLAMA_URL", url.trim())?;
            return Ok(url.trim().to_string());
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Constructs a config for the **chat** model.
///
/// # Env
/// - `OLLAMA_MODEL` (required)
/// - `LLM_MAX_TOKENS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.1)` (factual answers over retrieved context)
/// - `timeout_secs = Some(600)`
pub fn config_ollama_chat() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let endpoint = ollama_endpoint()?;
    let model = must_env("OLLAMA_MODEL")?;
    let max_tokens = env_opt::<u32>("LLM_MAX_TOKENS")?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: None,
        max_tokens,
        temperature: Some(0.1),
        top_p: None,
        timeout_secs: Some(600),
    })
}

/// Constructs a config for the default **embedding** model.
///
/// # Env
/// - `EMBEDDING_MODEL` (required)
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let model = must_env("EMBEDDING_MODEL")?;
    config_ollama_embedding_for(model)
}

/// Constructs an embedding config for an explicit model name.
///
/// Used for domain embedding models selected by name rather than by
/// `EMBEDDING_MODEL`.
///
/// # Errors
/// [`ConfigError::EmptyModel`] if `model` is blank.
pub fn config_ollama_embedding_for(model: impl Into<String>) -> Result<LlmModelConfig, AiLlmError> {
    let model = model.into();
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    let provider = provider_from_env()?;
    let endpoint = ollama_endpoint()?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}
