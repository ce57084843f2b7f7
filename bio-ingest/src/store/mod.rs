//! Vector storage for ingested chunks.
//!
//! Every [`EmbeddingSelector`] is its own vector space: a chunk is stored once
//! per loaded embedding model and queries only ever compare vectors of the
//! same model. [`QdrantStore`] is the service backend; [`MemoryStore`] keeps
//! everything in process for tests and offline runs.

use std::{future::Future, pin::Pin, sync::Arc};

use bio_embedding::EmbeddingSelector;
use serde::Serialize;

use crate::{document::Document, errors::StoreError};

mod config;
mod memory;
mod qdrant;

pub use config::{StoreBackend, StoreConfig};
pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// A retrieved document with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: Arc<Document>,
    pub score: f32,
}

/// Vectors of one space for a batch; `vectors[i]` belongs to the i-th document.
pub type SpaceVectors = (EmbeddingSelector, Vec<Vec<f32>>);

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Stores `documents` with their vectors in every listed space. An id that
    /// is already present is replaced.
    fn upsert<'a>(
        &'a self,
        documents: Vec<Document>,
        spaces: Vec<SpaceVectors>,
    ) -> StoreFuture<'a, Vec<Arc<Document>>>;

    /// Top-`k` documents of `space` by cosine similarity, best first. An empty
    /// space or a query of the wrong length yields no hits.
    fn search<'a>(
        &'a self,
        space: EmbeddingSelector,
        query: &'a [f32],
        k: usize,
    ) -> StoreFuture<'a, Vec<ScoredDocument>>;

    /// Backend name for logs and `/health`.
    fn backend(&self) -> &'static str;
}

/// Builds the backend selected by `cfg` and prepares one space per entry of
/// `spaces` (`(space, dimension)`).
pub async fn connect_store(
    cfg: &StoreConfig,
    spaces: &[(EmbeddingSelector, usize)],
) -> Result<Arc<dyn VectorStore>, StoreError> {
    match cfg.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Qdrant => {
            let store = QdrantStore::connect(cfg)?;
            for &(space, dim) in spaces {
                store.ensure_space(space, dim).await?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Each space must hold one vector per document, all of the same length.
/// Returns the length per space.
pub(crate) fn check_batch(
    documents: &[Document],
    spaces: &[SpaceVectors],
) -> Result<Vec<(EmbeddingSelector, usize)>, StoreError> {
    let mut dims = Vec::with_capacity(spaces.len());
    for (space, vectors) in spaces {
        if vectors.len() != documents.len() {
            let missing = documents
                .get(vectors.len())
                .map(|d| d.id.clone())
                .unwrap_or_default();
            return Err(StoreError::MissingVector(missing, *space));
        }
        let Some(want) = vectors.first().map(Vec::len) else {
            continue;
        };
        if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
            return Err(StoreError::VectorSizeMismatch {
                space: *space,
                got: bad.len(),
                want,
            });
        }
        dims.push((*space, want));
    }
    Ok(dims)
}
