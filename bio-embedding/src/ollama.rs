//! Embedding provider backed by the Ollama runtime.

use std::{sync::Arc, time::Duration};

use ai_llm_service::{LlmModelConfig, LlmServiceProfiles};
use tracing::{debug, info};

use crate::{
    errors::EmbeddingError,
    provider::{EmbedFuture, EmbeddingsProvider, check_dim},
};

/// Text embedded once at load time to verify the model and learn its dimension.
pub(crate) const PROBE_TEXT: &str = "protein kinase inhibitor";

/// Ollama embedding provider.
///
/// Holds its own model config so the same shared [`LlmServiceProfiles`] can
/// serve several embedding models side by side.
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    cfg: LlmModelConfig,
    dim: usize,
}

impl OllamaEmbedder {
    /// Embeds [`PROBE_TEXT`] once under `timeout` and records the vector size.
    ///
    /// # Errors
    /// - [`EmbeddingError::EmptyModelName`] if `cfg.model` is blank
    /// - [`EmbeddingError::LoadTimeout`] if the probe does not answer in time
    /// - [`EmbeddingError::Llm`] if Ollama rejects the model (e.g. not pulled)
    pub async fn load(
        svc: Arc<LlmServiceProfiles>,
        cfg: LlmModelConfig,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if cfg.model.trim().is_empty() {
            return Err(EmbeddingError::EmptyModelName);
        }

        let probe = tokio::time::timeout(timeout, svc.embed_with(&cfg, PROBE_TEXT))
            .await
            .map_err(|_| EmbeddingError::LoadTimeout {
                model: cfg.model.clone(),
                timeout,
            })??;

        if probe.is_empty() {
            return Err(EmbeddingError::ModelInit(format!(
                "model '{}' returned an empty vector",
                cfg.model
            )));
        }

        info!(model = %cfg.model, dim = probe.len(), "ollama embedder ready");
        Ok(Self {
            svc,
            dim: probe.len(),
            cfg,
        })
    }

    /// Builds an embedder with a known dimension, skipping the probe.
    pub fn with_dimension(svc: Arc<LlmServiceProfiles>, cfg: LlmModelConfig, dim: usize) -> Self {
        Self { svc, cfg, dim }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        Box::pin(async move {
            let v = self.svc.embed_with(&self.cfg, text).await?;
            check_dim(&v, self.dim)?;
            Ok(v)
        })
    }

    fn embed_texts<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            debug!(model = %self.cfg.model, batch = texts.len(), "embedding batch");
            let out = self.svc.embed_many_with(&self.cfg, texts).await?;
            for v in &out {
                check_dim(v, self.dim)?;
            }
            Ok(out)
        })
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.cfg.model
    }
}
