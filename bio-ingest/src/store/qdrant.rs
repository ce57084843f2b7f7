//! [`VectorStore`] on Qdrant: one collection per embedding space.
//!
//! A point's id is the chunk id (UUIDv5) and its payload is the serialized
//! [`Document`] (`id`, `text`, `metadata`).

use std::{collections::HashMap, sync::Arc};

use bio_embedding::EmbeddingSelector;
use qdrant_client::{
    Payload, Qdrant,
    qdrant::{
        CreateCollectionBuilder, Distance, PointStruct, SearchParamsBuilder, SearchPointsBuilder,
        UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, value::Kind,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{
    ScoredDocument, SpaceVectors, StoreConfig, StoreFuture, VectorStore, check_batch,
};
use crate::{document::Document, errors::StoreError};

pub struct QdrantStore {
    client: Qdrant,
    prefix: String,
    upsert_batch: usize,
    exact: bool,
    /// Vector size of every collection this store has prepared.
    dims: RwLock<HashMap<EmbeddingSelector, usize>>,
}

impl QdrantStore {
    /// Builds the client. No request is sent until the first call.
    pub fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(qdrant_err)?;

        Ok(Self {
            client,
            prefix: cfg.collection_prefix.clone(),
            upsert_batch: cfg.upsert_batch,
            exact: cfg.exact_search,
            dims: RwLock::new(HashMap::new()),
        })
    }

    pub fn collection(&self, space: EmbeddingSelector) -> String {
        format!("{}_{}", self.prefix, space)
    }

    /// Creates the collection of `space` with cosine distance unless it exists.
    pub async fn ensure_space(&self, space: EmbeddingSelector, size: usize) -> Result<(), StoreError> {
        let name = self.collection(space);
        let exists = self
            .client
            .collection_exists(name.clone())
            .await
            .map_err(qdrant_err)?;

        if exists {
            debug!(target: "bio_ingest::store", collection = %name, "collection already exists");
        } else {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&name)
                        .vectors_config(VectorParamsBuilder::new(size as u64, Distance::Cosine)),
                )
                .await
                .map_err(qdrant_err)?;
            info!(target: "bio_ingest::store", collection = %name, size, "collection created");
        }

        self.dims.write().await.insert(space, size);
        Ok(())
    }

    async fn known_dim(&self, space: EmbeddingSelector) -> Option<usize> {
        self.dims.read().await.get(&space).copied()
    }

    async fn upsert_batch(
        &self,
        documents: Vec<Document>,
        spaces: Vec<SpaceVectors>,
    ) -> Result<Vec<Arc<Document>>, StoreError> {
        for (space, got) in check_batch(&documents, &spaces)? {
            match self.known_dim(space).await {
                Some(want) if want != got => {
                    return Err(StoreError::VectorSizeMismatch { space, got, want });
                }
                Some(_) => {}
                None => self.ensure_space(space, got).await?,
            }
        }

        let payloads = documents
            .iter()
            .map(to_payload)
            .collect::<Result<Vec<_>, _>>()?;

        for (space, vectors) in spaces {
            let name = self.collection(space);
            let points: Vec<PointStruct> = documents
                .iter()
                .zip(vectors)
                .zip(&payloads)
                .map(|((doc, v), payload)| PointStruct::new(doc.id.clone(), v, payload.clone()))
                .collect();

            for batch in points.chunks(self.upsert_batch) {
                self.client
                    .upsert_points(UpsertPointsBuilder::new(&name, batch.to_vec()).wait(true))
                    .await
                    .map_err(qdrant_err)?;
            }
            debug!(target: "bio_ingest::store", collection = %name, points = points.len(), "points upserted");
        }

        Ok(documents.into_iter().map(Arc::new).collect())
    }

    async fn query(
        &self,
        space: EmbeddingSelector,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        if self.known_dim(space).await != Some(query.len()) {
            debug!(
                target: "bio_ingest::store",
                space = %space,
                query_dim = query.len(),
                "space not prepared or query dimension differs"
            );
            return Ok(Vec::new());
        }

        let mut builder =
            SearchPointsBuilder::new(self.collection(space), query.to_vec(), k as u64).with_payload(true);
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self.client.search_points(builder).await.map_err(qdrant_err)?;
        res.result
            .into_iter()
            .map(|p| {
                Ok(ScoredDocument {
                    document: Arc::new(from_payload(p.payload)?),
                    score: p.score,
                })
            })
            .collect()
    }
}

impl VectorStore for QdrantStore {
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
        Box::pin(self.query(space, query, k))
    }

    fn backend(&self) -> &'static str {
        "qdrant"
    }
}

fn qdrant_err(e: qdrant_client::QdrantError) -> StoreError {
    StoreError::Qdrant(e.to_string())
}

fn to_payload(doc: &Document) -> Result<Payload, StoreError> {
    let json = serde_json::to_value(doc).map_err(|e| StoreError::Payload(e.to_string()))?;
    Payload::try_from(json).map_err(|e| StoreError::Payload(e.to_string()))
}

fn from_payload(payload: HashMap<String, QValue>) -> Result<Document, StoreError> {
    let json = serde_json::Value::Object(
        payload
            .into_iter()
            .map(|(k, v)| (k, to_json(v)))
            .collect(),
    );
    serde_json::from_value(json).map_err(|e| StoreError::Payload(e.to_string()))
}

fn to_json(v: QValue) -> serde_json::Value {
    match v.kind {
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(f)) => serde_json::Value::from(f),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields.into_iter().map(|(k, v)| (k, to_json(v))).collect(),
        ),
        Some(Kind::ListValue(l)) => {
            serde_json::Value::Array(l.values.into_iter().map(to_json).collect())
        }
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}
