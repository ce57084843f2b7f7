use std::{path::PathBuf, sync::Arc};

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_ollama_chat, config_ollama_embedding},
};
use bio_contextor::{ChatService, ContextorConfig};
use bio_embedding::{
    BioEmbedding, BioEmbeddingConfig, EmbeddingMode, EmbeddingRegistry, OllamaEmbedder,
};
use bio_ingest::{
    IngestComponent, IngestError, PlainTextIngestion, StoreConfig, VectorStore, connect_store,
};
use tracing::{info, warn};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Chat and embedding profiles, also used for `/health`.
    pub llm_profiles: Arc<LlmServiceProfiles>,
    /// Loaded embedding spaces.
    pub registry: EmbeddingRegistry,
    pub store: Arc<dyn VectorStore>,
    pub ingest: IngestComponent,
    pub chat: ChatService,
    /// Canonical directory that `path` ingestion is confined to. `None`
    /// disables it.
    pub ingest_root: Option<PathBuf>,
}

impl AppState {
    /// Loads configuration from the environment and initializes every model.
    ///
    /// The default embedding model is always probed. With `EMBEDDING_MODE=bio`
    /// the biomedical model is loaded too; any load failure aborts startup.
    /// The vector store gets one collection per loaded space.
    pub async fn bootstrap() -> Result<Self, AppError> {
        let chat_cfg = config_ollama_chat()?;
        let embedding_cfg = config_ollama_embedding()?;
        let llm_profiles = Arc::new(LlmServiceProfiles::new(
            chat_cfg,
            embedding_cfg.clone(),
            Some(10),
        )?);

        let bio_cfg = BioEmbeddingConfig::from_env()?;
        let default =
            OllamaEmbedder::load(llm_profiles.clone(), embedding_cfg, bio_cfg.load_timeout())
                .await?;

        let bio = match EmbeddingMode::from_env()? {
            EmbeddingMode::Bio => Some(Arc::new(
                BioEmbedding::load(bio_cfg, llm_profiles.clone()).await?,
            )),
            EmbeddingMode::Default => None,
        };

        let registry = EmbeddingRegistry::new(Arc::new(default), bio);
        let spaces: Vec<_> = registry
            .describe()
            .iter()
            .map(|s| (s.space, s.dimension))
            .collect();
        let store_cfg = StoreConfig::from_env().map_err(IngestError::from)?;
        let store = connect_store(&store_cfg, &spaces)
            .await
            .map_err(IngestError::from)?;

        let base = PlainTextIngestion::from_env().map_err(IngestError::from)?;
        let ingest = IngestComponent::new(Arc::new(base), registry.clone(), store.clone());
        let chat = ChatService::new(
            llm_profiles.clone(),
            registry.clone(),
            store.clone(),
            ContextorConfig::from_env(),
        );
        let ingest_root = ingest_root_from_env().await?;

        info!(
            spaces = ?registry.describe(),
            store = store.backend(),
            ingest_root = ?ingest_root,
            "application state ready"
        );
        Ok(Self {
            llm_profiles,
            registry,
            store,
            ingest,
            chat,
            ingest_root,
        })
    }
}

/// `INGEST_ROOT`, canonicalized. Unset or blank disables path ingestion.
async fn ingest_root_from_env() -> Result<Option<PathBuf>, AppError> {
    let Some(raw) = std::env::var("INGEST_ROOT")
        .ok()
        .filter(|v| !v.trim().is_empty())
    else {
        warn!("INGEST_ROOT is not set; ingestion by `path` is disabled");
        return Ok(None);
    };

    let root = tokio::fs::canonicalize(raw.trim())
        .await
        .map_err(|e| AppError::Config(format!("INGEST_ROOT '{raw}': {e}")))?;
    if !root.is_dir() {
        return Err(AppError::Config(format!(
            "INGEST_ROOT '{}' is not a directory",
            root.display()
        )));
    }
    Ok(Some(root))
}
