use crate::config::llm_provider::LlmProvider;

/// One model profile: which runtime, which model, and how to call it.
///
/// The same struct describes the chat model, the default embedding model and
/// a biomedical embedding model served by the same runtime; only `model` and
/// the sampling knobs differ.
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let chat = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     model: "llama3.1:8b".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     max_tokens: Some(2048),
///     temperature: Some(0.1),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// let bio = LlmModelConfig { model: "biobert".into(), ..chat.clone() };
/// assert_eq!(bio.endpoint, chat.endpoint);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    /// Runtime model tag, e.g. `nomic-embed-text` or `llama3.1:8b`.
    pub model: String,
    /// Base URL with scheme; route suffixes are appended by the client.
    pub endpoint: String,
    /// Sent only to runtimes that need it; a local Ollama ignores it.
    pub api_key: Option<String>,
    /// Forwarded as `num_predict`.
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Per-request timeout; the client default is 60s.
    pub timeout_secs: Option<u64>,
}
