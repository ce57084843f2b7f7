//! Runtime configuration loaded from environment variables.

/// Retrieval knobs. All fields have defaults via [`ContextorConfig::from_env`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Chunks retrieved per question (`RAG_TOP_K`).
    pub top_k: usize,
    /// Character budget of the context block (`MAX_CTX_CHARS`).
    pub max_ctx_chars: usize,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            max_ctx_chars: 8500,
        }
    }
}

impl ContextorConfig {
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            top_k: parse("RAG_TOP_K", d.top_k).max(1),
            max_ctx_chars: parse("MAX_CTX_CHARS", d.max_ctx_chars),
        }
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
