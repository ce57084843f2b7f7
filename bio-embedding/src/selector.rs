use std::fmt;

use serde::Serialize;

/// Named embedding space. Each loaded provider owns one space in the store,
/// so queries are always compared against vectors from the same model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingSelector {
    /// General-purpose embedding model (`EMBEDDING_MODEL`).
    Default,
    /// Biomedical embedding model (`BIO_EMBEDDING_MODEL`).
    Bio,
}

impl EmbeddingSelector {
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingSelector::Default => "default",
            EmbeddingSelector::Bio => "bio",
        }
    }
}

impl fmt::Display for EmbeddingSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
