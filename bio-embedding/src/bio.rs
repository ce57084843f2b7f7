//! Biomedical embedding model selected by name.

use std::sync::Arc;

use ai_llm_service::{LlmModelConfig, LlmServiceProfiles};
use tracing::{error, info};

use crate::{
    config::{BioBackend, BioEmbeddingConfig},
    errors::EmbeddingError,
    ollama::OllamaEmbedder,
    provider::{EmbedFuture, EmbeddingsProvider},
};

/// A loaded biomedical embedding model.
///
/// Construction either returns a fully probed model or an error; there is no
/// half-initialized state. Implements [`EmbeddingsProvider`] by delegating to
/// the selected backend.
#[derive(Clone)]
pub struct BioEmbedding {
    inner: Arc<dyn EmbeddingsProvider>,
    backend: BioBackend,
}

impl std::fmt::Debug for BioEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BioEmbedding")
            .field("model", &self.inner.model_name())
            .field("backend", &self.backend)
            .field("dim", &self.inner.dimension())
            .finish()
    }
}

impl BioEmbedding {
    /// Loads the configured model and embeds one probe text, bounded by
    /// `cfg.load_timeout_secs`.
    ///
    /// For the Ollama backend the endpoint and client settings are taken from the
    /// default embedding profile of `svc`; only the model name differs.
    ///
    /// # Errors
    /// - [`EmbeddingError::EmptyModelName`] for a blank name
    /// - [`EmbeddingError::LoadTimeout`] when loading or probing exceeds the timeout
    /// - [`EmbeddingError::ModelNotFound`] for missing ONNX files
    /// - [`EmbeddingError::BackendDisabled`] for `onnx` without the `onnx` feature
    /// - [`EmbeddingError::Llm`] when Ollama does not serve the model
    pub async fn load(
        cfg: BioEmbeddingConfig,
        svc: Arc<LlmServiceProfiles>,
    ) -> Result<Self, EmbeddingError> {
        if cfg.model_name.trim().is_empty() {
            return Err(EmbeddingError::EmptyModelName);
        }

        let timeout = cfg.load_timeout();
        info!(
            model = %cfg.model_name,
            backend = ?cfg.backend,
            timeout_secs = timeout.as_secs(),
            "loading biomedical embedding model"
        );

        let result = match cfg.backend {
            BioBackend::Ollama => {
                let (_, base) = svc.profiles();
                let model_cfg = LlmModelConfig {
                    model: cfg.model_name.clone(),
                    ..base.clone()
                };
                OllamaEmbedder::load(svc, model_cfg, timeout)
                    .await
                    .map(|e| Arc::new(e) as Arc<dyn EmbeddingsProvider>)
            }
            BioBackend::Onnx => load_onnx(&cfg, timeout).await,
        };

        match result {
            Ok(inner) => {
                info!(model = %cfg.model_name, dim = inner.dimension(), "biomedical embedding model ready");
                Ok(Self {
                    inner,
                    backend: cfg.backend,
                })
            }
            Err(e) => {
                error!(model = %cfg.model_name, error = %e, "biomedical embedding model failed to load");
                Err(e)
            }
        }
    }

    /// Wraps an already constructed provider.
    pub fn from_provider(inner: Arc<dyn EmbeddingsProvider>, backend: BioBackend) -> Self {
        Self { inner, backend }
    }

    pub fn backend(&self) -> BioBackend {
        self.backend
    }
}

#[cfg(feature = "onnx")]
async fn load_onnx(
    cfg: &BioEmbeddingConfig,
    timeout: std::time::Duration,
) -> Result<Arc<dyn EmbeddingsProvider>, EmbeddingError> {
    let name = cfg.model_name.clone();
    let dir = cfg.model_dir();
    let task = tokio::task::spawn_blocking(move || crate::onnx::OnnxEmbedder::load(&name, &dir));

    let joined = tokio::time::timeout(timeout, task)
        .await
        .map_err(|_| EmbeddingError::LoadTimeout {
            model: cfg.model_name.clone(),
            timeout,
        })?;
    let embedder = joined.map_err(|e| EmbeddingError::ModelInit(format!("load task failed: {e}")))??;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
async fn load_onnx(
    _cfg: &BioEmbeddingConfig,
    _timeout: std::time::Duration,
) -> Result<Arc<dyn EmbeddingsProvider>, EmbeddingError> {
    Err(EmbeddingError::BackendDisabled("onnx"))
}

impl EmbeddingsProvider for BioEmbedding {
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        self.inner.embed_query(text)
    }

    fn embed_texts<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        self.inner.embed_texts(texts)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
