//! One ingestor for every biotech domain, parameterized by [`Mode`].

use std::sync::Arc;

use bio_metadata::{Mode, extract_metadata_for};
use tracing::{debug, info, warn};

use crate::{
    base::{BaseIngestion, FileData},
    document::Document,
    errors::IngestError,
};

/// Loads a file through the base pipeline, extracts the biotech fields
/// relevant to `mode` once per source document, tags it with
/// `document_type = <mode>` and splits it. Every chunk carries the fields of
/// the document it came from.
#[derive(Clone)]
pub struct DomainIngestor {
    mode: Mode,
    base: Arc<dyn BaseIngestion>,
}

impl DomainIngestor {
    pub fn new(mode: Mode, base: Arc<dyn BaseIngestion>) -> Self {
        Self { mode, base }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Ingests one file.
    ///
    /// Base pipeline errors are returned unchanged. A source document whose
    /// text cannot be analyzed keeps its base metadata (plus `document_type`)
    /// and ingestion continues with the rest.
    pub async fn ingest(
        &self,
        file_name: &str,
        data: &FileData,
    ) -> Result<Vec<Document>, IngestError> {
        info!(target: "bio_ingest::domain", mode = %self.mode, file_name, "ingesting document");

        let sources = self.base.load(file_name, data).await?;
        let mut documents = Vec::new();
        for mut source in sources {
            self.enrich(&mut source);
            documents.extend(self.base.split(&source));
        }

        info!(
            target: "bio_ingest::domain",
            mode = %self.mode,
            file_name,
            count = documents.len(),
            "transformed file into documents with domain metadata"
        );
        Ok(documents)
    }

    /// Ingests several files in order. The first base failure aborts the batch.
    pub async fn bulk_ingest(
        &self,
        files: &[(String, FileData)],
    ) -> Result<Vec<Document>, IngestError> {
        let mut all = Vec::new();
        for (file_name, data) in files {
            all.extend(self.ingest(file_name, data).await?);
        }
        Ok(all)
    }

    fn enrich(&self, doc: &mut Document) {
        match extract_metadata_for(&*doc, self.mode.fields()) {
            Ok(extracted) => {
                debug!(
                    target: "bio_ingest::domain",
                    id = %doc.id,
                    fields = extracted.len(),
                    "metadata extracted"
                );
                doc.apply_domain(self.mode, &extracted);
            }
            Err(e) => {
                warn!(
                    target: "bio_ingest::domain",
                    id = %doc.id,
                    error = %e,
                    "metadata extraction failed; keeping base metadata"
                );
                doc.apply_domain(self.mode, &Default::default());
            }
        }
    }
}
