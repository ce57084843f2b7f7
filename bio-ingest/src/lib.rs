//! Domain ingestion for BioRAG.
//!
//! - [`BaseIngestion`] / [`PlainTextIngestion`]: file → source documents → chunks
//! - [`DomainIngestor`]: base chunks + biotech metadata for one [`bio_metadata::Mode`]
//! - [`VectorStore`]: Qdrant or in-memory vectors, one space per embedding model
//! - [`IngestComponent`]: ingest, embed into every loaded space, store

mod base;
mod component;
mod document;
mod domain_ingestor;
mod errors;
mod store;

pub use base::{
    BaseIngestion, DEFAULT_CHUNK_CHARS, FileData, PlainTextIngestion, TransformFuture, chunk_id,
    chunk_text, source_id,
};
pub use component::IngestComponent;
pub use document::{CHUNK_INDEX_KEY, DOCUMENT_TYPE_KEY, Document, FILE_NAME_KEY};
pub use domain_ingestor::DomainIngestor;
pub use errors::{BaseIngestionError, IngestError, StoreError};
pub use store::{
    MemoryStore, QdrantStore, ScoredDocument, SpaceVectors, StoreBackend, StoreConfig, StoreFuture,
    VectorStore, connect_store,
};
