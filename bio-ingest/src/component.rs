//! Ingest → embed → store.

use std::sync::Arc;

use bio_embedding::EmbeddingRegistry;
use bio_metadata::Mode;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::{
    base::{BaseIngestion, FileData},
    document::Document,
    domain_ingestor::DomainIngestor,
    errors::IngestError,
    store::{SpaceVectors, VectorStore},
};

/// Number of chunks embedded per provider call.
const EMBED_BATCH: usize = 32;

/// Persists domain-ingested documents: every chunk is embedded into every
/// loaded embedding space, so any later query space finds it.
#[derive(Clone)]
pub struct IngestComponent {
    base: Arc<dyn BaseIngestion>,
    registry: EmbeddingRegistry,
    store: Arc<dyn VectorStore>,
    concurrency: usize,
}

impl IngestComponent {
    pub fn new(
        base: Arc<dyn BaseIngestion>,
        registry: EmbeddingRegistry,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            base,
            registry,
            store,
            concurrency: 4,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn ingestor(&self, mode: Mode) -> DomainIngestor {
        DomainIngestor::new(mode, self.base.clone())
    }

    pub async fn ingest(
        &self,
        mode: Mode,
        file_name: &str,
        data: &FileData,
    ) -> Result<Vec<Arc<Document>>, IngestError> {
        let docs = self.ingestor(mode).ingest(file_name, data).await?;
        self.save_docs(docs).await
    }

    pub async fn bulk_ingest(
        &self,
        mode: Mode,
        files: &[(String, FileData)],
    ) -> Result<Vec<Arc<Document>>, IngestError> {
        let docs = self.ingestor(mode).bulk_ingest(files).await?;
        self.save_docs(docs).await
    }

    async fn save_docs(&self, docs: Vec<Document>) -> Result<Vec<Arc<Document>>, IngestError> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let mut per_space: Vec<SpaceVectors> = Vec::new();

        for (space, provider) in self.registry.loaded() {
            // Owned batches keep the stream free of borrows of `texts`.
            let batches: Vec<Vec<String>> =
                texts.chunks(EMBED_BATCH).map(<[String]>::to_vec).collect();
            let vectors: Vec<Vec<f32>> = stream::iter(batches)
                .map(|batch| {
                    let provider = provider.clone();
                    async move { provider.embed_texts(&batch).await }
                })
                .buffered(self.concurrency)
                .try_concat()
                .await?;
            debug!(
                target: "bio_ingest::component",
                space = %space,
                model = provider.model_name(),
                count = vectors.len(),
                "chunks embedded"
            );
            per_space.push((space, vectors));
        }

        let spaces = per_space.len();
        let saved = self.store.upsert(docs, per_space).await?;

        info!(
            target: "bio_ingest::component",
            saved = saved.len(),
            spaces,
            backend = self.store.backend(),
            "documents stored"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::PlainTextIngestion, store::MemoryStore};
    use bio_embedding::{
        BioBackend, BioEmbedding, EmbeddingSelector, EmbeddingsProvider, HashEmbedder,
    };

    fn component(with_bio: bool) -> (IngestComponent, Arc<MemoryStore>) {
        let default: Arc<dyn EmbeddingsProvider> = Arc::new(HashEmbedder::new("general", 32));
        let bio = with_bio.then(|| {
            Arc::new(BioEmbedding::from_provider(
                Arc::new(HashEmbedder::new("biobert", 48)),
                BioBackend::Ollama,
            ))
        });
        let store = Arc::new(MemoryStore::new());
        let c = IngestComponent::new(
            Arc::new(PlainTextIngestion::new(60)),
            EmbeddingRegistry::new(default, bio),
            store.clone(),
        );
        (c, store)
    }

    #[tokio::test]
    async fn chunks_land_in_every_space() {
        let (c, store) = component(true);
        let text = "Osimertinib inhibits EGFR in lung cancer.\n\nDose: 80 mg daily.";
        let saved = c.ingest(Mode::Moa, "osi.txt", &FileData::from(text)).await.unwrap();
        assert_eq!(saved.len(), 2);

        let q = HashEmbedder::new("biobert", 48).vector("EGFR lung cancer");
        let hits = store.search(EmbeddingSelector::Bio, &q, 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, saved[0].id);
        assert_eq!(hits[0].document.metadata["document_type"], "moa");

        let q = HashEmbedder::new("general", 32).vector("EGFR lung cancer");
        let hits = store.search(EmbeddingSelector::Default, &q, 3).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn many_chunks_keep_order() {
        let (c, store) = component(false);
        let paragraphs: Vec<String> = (0..70).map(|i| format!("paragraph number {i} text")).collect();
        let text = paragraphs.join("\n\n");
        let saved = c
            .with_concurrency(3)
            .ingest(Mode::Clinical, "big.txt", &FileData::Bytes(text.into_bytes()))
            .await
            .unwrap();
        assert!(saved.len() > EMBED_BATCH);
        assert_eq!(store.len().await, saved.len());
        for (i, d) in saved.iter().enumerate() {
            assert_eq!(d.metadata["chunk_index"], i.to_string());
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn ingest_future_is_send() {
        let (c, _) = component(true);
        let data = FileData::from("Dose: 100mg daily.");
        let fut = c.ingest(Mode::Clinical, "trial.txt", &data);
        assert_send(&fut);
    }

    #[tokio::test]
    async fn stored_chunks_share_document_metadata() {
        let (c, store) = component(false);
        let filler = "Background paragraph about site logistics and staffing.";
        let text = format!("Dose: 100mg daily.\n\n{filler}\n\n{filler}");
        let saved = c
            .ingest(Mode::Clinical, "trial.txt", &FileData::from(text.as_str()))
            .await
            .unwrap();
        assert_eq!(saved.len(), 3);
        for d in &saved {
            let stored = store.get(&d.id).await.unwrap();
            assert_eq!(stored.metadata["dose_schema"], "100mg daily");
        }
    }

    #[tokio::test]
    async fn empty_file_stores_nothing() {
        let (c, store) = component(false);
        let saved = c.ingest(Mode::Protein, "empty.txt", &FileData::from("")).await.unwrap();
        assert!(saved.is_empty());
        assert!(store.is_empty().await);
    }
}
