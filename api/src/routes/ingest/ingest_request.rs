use std::{collections::BTreeMap, path::PathBuf};

use bio_metadata::Mode;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /v1/ingest/{mode}`.
///
/// Exactly one of `text` and `path` must be set.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub file_name: String,
    #[serde(default)]
    pub text: Option<String>,
    /// File under the server's `INGEST_ROOT`; relative paths start there.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub mode: Mode,
    pub file_name: String,
    pub documents: Vec<IngestedDocument>,
}

#[derive(Debug, Serialize)]
pub struct IngestedDocument {
    pub id: String,
    pub metadata: BTreeMap<String, String>,
    /// First characters of the chunk.
    pub preview: String,
}
