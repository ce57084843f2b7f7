use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::{bio::BioEmbedding, provider::EmbeddingsProvider, selector::EmbeddingSelector};

/// Loaded embedding providers, one per [`EmbeddingSelector`].
///
/// Created once by the bootstrap and injected where needed.
#[derive(Clone)]
pub struct EmbeddingRegistry {
    default: Arc<dyn EmbeddingsProvider>,
    bio: Option<Arc<BioEmbedding>>,
}

/// Serializable description of one loaded space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceInfo {
    pub space: EmbeddingSelector,
    pub model: String,
    pub dimension: usize,
}

impl EmbeddingRegistry {
    pub fn new(default: Arc<dyn EmbeddingsProvider>, bio: Option<Arc<BioEmbedding>>) -> Self {
        Self { default, bio }
    }

    /// True when a biomedical model is loaded.
    pub fn has_bio(&self) -> bool {
        self.bio.is_some()
    }

    /// Provider for the requested space.
    ///
    /// `None` selects the default model. Asking for [`EmbeddingSelector::Bio`]
    /// without a loaded biomedical model falls back to the default one.
    pub fn select(
        &self,
        selector: Option<EmbeddingSelector>,
    ) -> (EmbeddingSelector, Arc<dyn EmbeddingsProvider>) {
        match (selector, &self.bio) {
            (Some(EmbeddingSelector::Bio), Some(bio)) => {
                (EmbeddingSelector::Bio, bio.clone() as Arc<dyn EmbeddingsProvider>)
            }
            (Some(EmbeddingSelector::Bio), None) => {
                warn!("bio embedding requested but not loaded; using default model");
                (EmbeddingSelector::Default, self.default.clone())
            }
            _ => (EmbeddingSelector::Default, self.default.clone()),
        }
    }

    /// Every loaded space, default first.
    pub fn loaded(&self) -> Vec<(EmbeddingSelector, Arc<dyn EmbeddingsProvider>)> {
        let mut out = vec![(EmbeddingSelector::Default, self.default.clone())];
        if let Some(bio) = &self.bio {
            out.push((EmbeddingSelector::Bio, bio.clone() as Arc<dyn EmbeddingsProvider>));
        }
        out
    }

    pub fn describe(&self) -> Vec<SpaceInfo> {
        self.loaded()
            .into_iter()
            .map(|(space, p)| SpaceInfo {
                space,
                model: p.model_name().to_string(),
                dimension: p.dimension(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::BioBackend, hash_embedder::HashEmbedder};

    fn registry(with_bio: bool) -> EmbeddingRegistry {
        let default: Arc<dyn EmbeddingsProvider> = Arc::new(HashEmbedder::new("general", 8));
        let bio = with_bio.then(|| {
            Arc::new(BioEmbedding::from_provider(
                Arc::new(HashEmbedder::new("biobert", 16)),
                BioBackend::Ollama,
            ))
        });
        EmbeddingRegistry::new(default, bio)
    }

    #[test]
    fn bio_selected_when_loaded() {
        let r = registry(true);
        let (space, p) = r.select(Some(EmbeddingSelector::Bio));
        assert_eq!(space, EmbeddingSelector::Bio);
        assert_eq!(p.model_name(), "biobert");
        assert_eq!(r.loaded().len(), 2);
    }

    #[test]
    fn none_selects_default() {
        let r = registry(true);
        let (space, p) = r.select(None);
        assert_eq!(space, EmbeddingSelector::Default);
        assert_eq!(p.model_name(), "general");
    }

    #[test]
    fn bio_falls_back_when_missing() {
        let r = registry(false);
        let (space, p) = r.select(Some(EmbeddingSelector::Bio));
        assert_eq!(space, EmbeddingSelector::Default);
        assert_eq!(p.dimension(), 8);
        assert!(!r.has_bio());
    }

    #[test]
    fn describe_lists_spaces() {
        let info = registry(true).describe();
        assert_eq!(info[1].space, EmbeddingSelector::Bio);
        assert_eq!(info[1].dimension, 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shared_provider_embeds_concurrently() {
        let r = registry(true);
        let texts: Vec<String> = (0..32).map(|i| format!("EGFR inhibitor, cohort {i}")).collect();

        for space in [EmbeddingSelector::Default, EmbeddingSelector::Bio] {
            let (_, provider) = r.select(Some(space));

            let mut sequential = Vec::with_capacity(texts.len());
            for t in &texts {
                sequential.push(provider.embed_query(t).await.unwrap());
            }

            let handles: Vec<_> = texts
                .iter()
                .cloned()
                .map(|t| {
                    let provider = provider.clone();
                    tokio::spawn(async move { provider.embed_query(&t).await })
                })
                .collect();
            let mut concurrent = Vec::with_capacity(handles.len());
            for h in handles {
                concurrent.push(h.await.unwrap().unwrap());
            }

            assert_eq!(concurrent, sequential, "{space}");
        }
    }
}
