//! Base ingestion pipeline: raw file → source [`Document`]s → chunks.
//!
//! Domain logic runs between the two steps in [`crate::DomainIngestor`];
//! this module knows nothing about biotech fields.

use std::{future::Future, path::PathBuf, pin::Pin};

use tracing::debug;
use uuid::Uuid;

use crate::{
    document::{CHUNK_INDEX_KEY, Document, FILE_NAME_KEY},
    errors::BaseIngestionError,
};

pub const DEFAULT_CHUNK_CHARS: usize = 1500;

/// Raw file content handed to an ingestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    /// File on local disk.
    Path(PathBuf),
    /// Content already in memory (uploads, tests).
    Bytes(Vec<u8>),
}

impl FileData {
    pub async fn read_bytes(&self) -> Result<Vec<u8>, BaseIngestionError> {
        match self {
            FileData::Bytes(b) => Ok(b.clone()),
            FileData::Path(p) => {
                tokio::fs::read(p)
                    .await
                    .map_err(|source| BaseIngestionError::Io {
                        path: p.clone(),
                        source,
                    })
            }
        }
    }
}

impl From<&str> for FileData {
    fn from(text: &str) -> Self {
        FileData::Bytes(text.as_bytes().to_vec())
    }
}

pub type TransformFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Document>, BaseIngestionError>> + Send + 'a>>;

/// Converts one file into documents.
///
/// [`load`](Self::load) yields whole source documents (one per file for plain
/// text, one per page for paged formats). [`split`](Self::split) cuts one of
/// them into chunks that inherit its metadata.
pub trait BaseIngestion: Send + Sync {
    fn load<'a>(&'a self, file_name: &'a str, data: &'a FileData) -> TransformFuture<'a>;

    fn split(&self, document: &Document) -> Vec<Document>;

    /// `load` followed by `split` on every source document.
    fn transform<'a>(&'a self, file_name: &'a str, data: &'a FileData) -> TransformFuture<'a> {
        Box::pin(async move {
            let sources = self.load(file_name, data).await?;
            Ok(sources.iter().flat_map(|d| self.split(d)).collect())
        })
    }
}

/// Plain-text reader with paragraph-aware chunking.
///
/// Bytes are decoded as UTF-8 lossily; invalid sequences become U+FFFD, which
/// the metadata extractor later treats as malformed text.
#[derive(Debug, Clone)]
pub struct PlainTextIngestion {
    max_chunk_chars: usize,
}

impl Default for PlainTextIngestion {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CHARS)
    }
}

impl PlainTextIngestion {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// `INGEST_CHUNK_CHARS` or the default.
    pub fn from_env() -> Result<Self, BaseIngestionError> {
        match std::env::var("INGEST_CHUNK_CHARS") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::new)
                .ok_or_else(|| {
                    BaseIngestionError::InvalidInput(format!(
                        "INGEST_CHUNK_CHARS must be a positive integer, got '{v}'"
                    ))
                }),
            _ => Ok(Self::default()),
        }
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }
}

impl BaseIngestion for PlainTextIngestion {
    fn load<'a>(&'a self, file_name: &'a str, data: &'a FileData) -> TransformFuture<'a> {
        Box::pin(async move {
            if file_name.trim().is_empty() {
                return Err(BaseIngestionError::InvalidInput("file_name is empty".into()));
            }
            let bytes = data.read_bytes().await?;
            let text = String::from_utf8_lossy(&bytes);
            debug!(target: "bio_ingest::base", file_name, bytes = bytes.len(), "file loaded");
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }

            let mut doc = Document::new(source_id(file_name), text.into_owned());
            doc.metadata
                .insert(FILE_NAME_KEY.to_string(), file_name.to_string());
            Ok(vec![doc])
        })
    }

    fn split(&self, document: &Document) -> Vec<Document> {
        let chunks: Vec<Document> = chunk_text(&document.text, self.max_chunk_chars)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut chunk = Document::new(chunk_id(&document.id, i), text);
                chunk.metadata = document.metadata.clone();
                chunk
                    .metadata
                    .insert(CHUNK_INDEX_KEY.to_string(), i.to_string());
                chunk
            })
            .collect();
        debug!(target: "bio_ingest::base", id = %document.id, chunks = chunks.len(), "document split");
        chunks
    }
}

/// Deterministic UUIDv5 of a source file.
pub fn source_id(file_name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, file_name.as_bytes()).to_string()
}

/// Deterministic UUIDv5 of a chunk from its source id and position.
pub fn chunk_id(source_id: &str, index: usize) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{source_id}#{index}").as_bytes()).to_string()
}

/// Packs blank-line separated paragraphs into chunks of at most `max_chars`
/// characters. Oversized paragraphs are split on whitespace, or hard-split
/// when a single word is longer than the limit.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    let paragraphs = text
        .split("\n\n")
        .flat_map(|p| p.split("\r\n\r\n"))
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for para in paragraphs {
        for piece in split_long(para, max_chars) {
            let sep = if current.is_empty() { 0 } else { 2 };
            if !current.is_empty()
                && current.chars().count() + sep + piece.chars().count() > max_chars
            {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_long(para: &str, max_chars: usize) -> Vec<String> {
    if para.chars().count() <= max_chars {
        return vec![para.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    let mut len = 0usize;
    for word in para.split_whitespace() {
        let wlen = word.chars().count();
        if wlen > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            out.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let sep = usize::from(!current.is_empty());
        if len + sep + wlen > max_chars {
            out.push(std::mem::take(&mut current));
            len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            len += 1;
        }
        current.push_str(word);
        len += wlen;
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_are_packed_up_to_limit() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        assert_eq!(chunk_text(text, 10), vec!["aaaa\n\nbbbb", "cccc"]);
        assert_eq!(chunk_text(text, 100), vec!["aaaa\n\nbbbb\n\ncccc"]);
    }

    #[test]
    fn long_paragraph_splits_on_words() {
        let chunks = chunk_text("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn oversized_word_is_hard_split() {
        assert_eq!(chunk_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(chunk_text("", 10).is_empty());
        assert!(chunk_text("\n\n  \n\n", 10).is_empty());
    }

    #[test]
    fn ids_are_stable_and_distinct() {
        let a = source_id("a.txt");
        assert_eq!(a, source_id("a.txt"));
        assert_ne!(a, source_id("b.txt"));
        assert_eq!(chunk_id(&a, 0), chunk_id(&a, 0));
        assert_ne!(chunk_id(&a, 0), chunk_id(&a, 1));
        assert_ne!(chunk_id(&a, 0), chunk_id(&source_id("b.txt"), 0));
        assert!(Uuid::parse_str(&chunk_id(&a, 3)).is_ok());
    }

    #[tokio::test]
    async fn load_keeps_the_whole_file() {
        let base = PlainTextIngestion::new(20);
        let data = FileData::from("first paragraph\n\nsecond paragraph");
        let sources = base.load("trial.txt", &data).await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, source_id("trial.txt"));
        assert_eq!(sources[0].text, "first paragraph\n\nsecond paragraph");
        assert_eq!(sources[0].file_name(), Some("trial.txt"));
    }

    #[tokio::test]
    async fn chunks_inherit_source_metadata() {
        let base = PlainTextIngestion::new(20);
        let mut source = Document::new(source_id("trial.txt"), "first paragraph\n\nsecond paragraph");
        source.metadata.insert(FILE_NAME_KEY.into(), "trial.txt".into());
        source.metadata.insert("dose_schema".into(), "100mg daily".into());

        let chunks = base.split(&source);
        assert_eq!(chunks.len(), 2);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.metadata["chunk_index"], i.to_string());
            assert_eq!(c.metadata["dose_schema"], "100mg daily");
            assert_eq!(c.id, chunk_id(&source.id, i));
        }
    }

    #[tokio::test]
    async fn transform_loads_then_splits() {
        let base = PlainTextIngestion::new(20);
        let data = FileData::from("first paragraph\n\nsecond paragraph");
        let docs = base.transform("trial.txt", &data).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].metadata["chunk_index"], "1");
        assert_eq!(docs[0].file_name(), Some("trial.txt"));
        assert_eq!(docs[0].id, chunk_id(&source_id("trial.txt"), 0));
    }

    #[tokio::test]
    async fn blank_file_loads_nothing() {
        let base = PlainTextIngestion::default();
        assert!(base.load("empty.txt", &FileData::from(" \n\n ")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_path_is_io_error() {
        let base = PlainTextIngestion::default();
        let data = FileData::Path(PathBuf::from("/definitely/not/here.txt"));
        let err = base.transform("here.txt", &data).await.unwrap_err();
        assert!(matches!(err, BaseIngestionError::Io { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let base = PlainTextIngestion::default();
        let data = FileData::Bytes(vec![b'o', b'k', 0xff, b'!']);
        let docs = base.transform("bin.dat", &data).await.unwrap();
        assert!(docs[0].text.contains('\u{FFFD}'));
    }
}
