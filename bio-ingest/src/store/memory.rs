//! In-process [`VectorStore`] with a linear cosine scan.

use std::{collections::HashMap, sync::Arc};

use bio_embedding::{EmbeddingSelector, cosine};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ScoredDocument, SpaceVectors, StoreFuture, VectorStore, check_batch};
use crate::{document::Document, errors::StoreError};

#[derive(Default)]
struct Space {
    dim: Option<usize>,
    entries: Vec<(Arc<Document>, Vec<f32>)>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Arc<Document>>,
    spaces: HashMap<EmbeddingSelector, Space>,
}

/// Vectors in one space must all have the same length; the first insert
/// fixes it.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.inner.read().await.documents.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn upsert_batch(
        &self,
        documents: Vec<Document>,
        spaces: Vec<SpaceVectors>,
    ) -> Result<Vec<Arc<Document>>, StoreError> {
        let dims = check_batch(&documents, &spaces)?;
        let mut inner = self.inner.write().await;

        for (space, got) in dims {
            if let Some(want) = inner.spaces.get(&space).and_then(|s| s.dim) {
                if got != want {
                    return Err(StoreError::VectorSizeMismatch { space, got, want });
                }
            }
        }

        let saved: Vec<Arc<Document>> = documents.into_iter().map(Arc::new).collect();
        for doc in &saved {
            if inner.documents.insert(doc.id.clone(), doc.clone()).is_some() {
                for space in inner.spaces.values_mut() {
                    space.entries.retain(|(d, _)| d.id != doc.id);
                }
            }
        }

        for (space, vectors) in spaces {
            let s = inner.spaces.entry(space).or_default();
            for (doc, v) in saved.iter().zip(vectors) {
                s.dim.get_or_insert(v.len());
                s.entries.push((doc.clone(), v));
            }
        }
        Ok(saved)
    }

    async fn scan(&self, space: EmbeddingSelector, query: &[f32], k: usize) -> Vec<ScoredDocument> {
        let inner = self.inner.read().await;
        let Some(s) = inner.spaces.get(&space) else {
            return Vec::new();
        };
        if s.dim != Some(query.len()) {
            debug!(
                target: "bio_ingest::store",
                space = %space,
                query_dim = query.len(),
                "query dimension does not match space"
            );
            return Vec::new();
        }

        let mut hits: Vec<ScoredDocument> = s
            .entries
            .iter()
            .map(|(d, v)| ScoredDocument {
                document: d.clone(),
                score: cosine(query, v),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits
    }
}

impl VectorStore for MemoryStore {
    fn upsert<'a>(
        &'a self,
        documents: Vec<Document>,
        spaces: Vec<SpaceVectors>,
    ) -> StoreFuture<'a, Vec<Arc<Document>>> {
        Box::pin(self.upsert_batch(documents, spaces))
    }

    fn search<'a>(
        &'a self,
        space: EmbeddingSelector,
        query: &'a [f32],
        k: usize,
    ) -> StoreFuture<'a, Vec<ScoredDocument>> {
        Box::pin(async move { Ok(self.scan(space, query, k).await) })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
