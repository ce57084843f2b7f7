use std::{future::Future, pin::Pin};

use crate::errors::EmbeddingError;

/// Boxed future returned by [`EmbeddingsProvider`] methods.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EmbeddingError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Implementations are shared through `Arc` and must be usable concurrently
/// without caller-side locking.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds a single query string.
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>>;

    /// Embeds a batch of texts; output order matches input order.
    fn embed_texts<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>>;

    /// Vector length produced by this provider.
    fn dimension(&self) -> usize;

    /// Name of the underlying model.
    fn model_name(&self) -> &str;
}

/// Rejects vectors whose length differs from `want`.
pub(crate) fn check_dim(v: &[f32], want: usize) -> Result<(), EmbeddingError> {
    if v.len() != want {
        return Err(EmbeddingError::VectorSizeMismatch { got: v.len(), want });
    }
    Ok(())
}
