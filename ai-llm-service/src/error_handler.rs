//! Errors of the LLM access layer and the env helpers that produce them.
//!
//! [`AiLlmError`] is what callers see; [`ConfigError`] covers startup
//! configuration and [`HealthError`] the `/api/tags` probe.

use std::{str::FromStr, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

use crate::services::ollama_service::OllamaError;

pub type Result<T> = std::result::Result<T, AiLlmError>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Health(#[from] HealthError),

    /// Chat, generation or embedding call failed.
    #[error(transparent)]
    Ollama(#[from] OllamaError),

    /// The shared HTTP client could not be built or a probe could not connect.
    #[error("[LLM] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    #[error("[LLM] no answer within {0:?}")]
    Timeout(Duration),
}

/// Invalid or missing startup configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[LLM] missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("[LLM] invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// `LLM_KIND` names a provider this build cannot talk to.
    #[error("[LLM] unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("[LLM] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    #[error("[LLM] model name must not be empty")]
    EmptyModel,
}

/// Non-2xx answer from the model runtime.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// See [`make_snippet`].
    pub snippet: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("[LLM] health probe failed: {0}")]
    HttpStatus(HttpError),
}

const SNIPPET_CHARS: usize = 240;

/// First [`SNIPPET_CHARS`] characters of an upstream body, on one line.
pub fn make_snippet(body: &str) -> String {
    body.trim()
        .chars()
        .take(SNIPPET_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Required, non-blank environment variable.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Optional numeric environment variable; unset or blank is `Ok(None)`.
///
/// # Errors
/// [`ConfigError::InvalidNumber`] when the value is set but does not parse as `T`.
pub fn env_opt<T: FromStr>(name: &'static str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => parse_num(name, &v).map(Some),
        _ => Ok(None),
    }
}

fn parse_num<T: FromStr>(name: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidNumber {
            var: name,
            reason: "expected a non-negative integer",
        }
        .into()
    })
}

/// Requires an `http://` or `https://` scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}
