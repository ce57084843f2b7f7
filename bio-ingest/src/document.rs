use std::collections::BTreeMap;

use bio_metadata::{BioMetadata, Mode, TextSource};
use serde::{Deserialize, Serialize};

/// Metadata key marking the domain a document was ingested under.
pub const DOCUMENT_TYPE_KEY: &str = "document_type";
pub const FILE_NAME_KEY: &str = "file_name";
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// One ingested chunk of text with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds biotech fields and the `document_type` marker.
    /// Keys outside the biotech set are left untouched.
    pub fn apply_domain(&mut self, mode: Mode, extracted: &BioMetadata) {
        extracted.merge_into(&mut self.metadata);
        self.metadata
            .insert(DOCUMENT_TYPE_KEY.to_string(), mode.document_type().to_string());
    }

    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get(FILE_NAME_KEY).map(String::as_str)
    }
}

impl TextSource for Document {
    fn text(&self) -> &str {
        &self.text
    }
}
