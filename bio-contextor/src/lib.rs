//! Mode dispatch and RAG chat for BioRAG.
//!
//! [`ModeDispatcher`] maps an optional [`bio_metadata::Mode`] to a
//! [`PromptTemplate`] and an optional embedding space. [`ChatService`] uses it
//! to retrieve context from the matching space, format the conversation and
//! call the chat backend.

mod api_types;
mod cfg;
mod dispatch;
mod error;
mod llm;
mod prompt;
mod service;
mod templates;

pub use api_types::{ChatAnswer, ChatOptions, UsedChunk};
pub use cfg::ContextorConfig;
pub use dispatch::{ModeDispatcher, Resolution};
pub use error::ContextorError;
pub use llm::{ChatBackend, ChatFuture};
pub use prompt::build_context;
pub use service::ChatService;
pub use templates::{
    CLINICAL_TEMPLATE, DEFAULT_TEMPLATE, MOA_TEMPLATE, PROTEIN_TEMPLATE, PromptTemplate,
    REGULATORY_TEMPLATE, template_for,
};
