//! Mode → (template, embedding space).

use bio_embedding::EmbeddingSelector;
use bio_metadata::{Mode, ModeError};

use crate::templates::{DEFAULT_TEMPLATE, PromptTemplate, template_for};

/// Outcome of [`ModeDispatcher::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub mode: Option<Mode>,
    pub template: &'static PromptTemplate,
    /// `None` keeps the default retrieval path.
    pub embedding: Option<EmbeddingSelector>,
}

/// Selects the prompt template and retrieval space for a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeDispatcher {
    bio_embedding: bool,
}

impl ModeDispatcher {
    /// `bio_embedding` tells whether a biomedical embedding model is loaded.
    pub fn new(bio_embedding: bool) -> Self {
        Self { bio_embedding }
    }

    /// No mode → default template, no override. A mode → its template, plus
    /// the bio space when a biomedical model is loaded.
    pub fn resolve(&self, mode: Option<Mode>) -> Resolution {
        match mode {
            None => Resolution {
                mode: None,
                template: &DEFAULT_TEMPLATE,
                embedding: None,
            },
            Some(m) => Resolution {
                mode: Some(m),
                template: template_for(m),
                embedding: self.bio_embedding.then_some(EmbeddingSelector::Bio),
            },
        }
    }

    /// Parses the wire value first; values outside the four modes are rejected.
    pub fn resolve_str(&self, mode: Option<&str>) -> Result<Resolution, ModeError> {
        Ok(self.resolve(Mode::parse_opt(mode)?))
    }
}
