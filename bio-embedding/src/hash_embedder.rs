//! Deterministic, network-free embedder.
//!
//! Produces L2-normalized vectors from hashed word features, so texts sharing
//! words land close together. Used by tests across the workspace and as an
//! offline stand-in.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use crate::provider::{EmbedFuture, EmbeddingsProvider};

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    name: String,
    dim: usize,
}

impl HashEmbedder {
    pub fn new(name: impl Into<String>, dim: usize) -> Self {
        Self {
            name: name.into(),
            dim: dim.max(1),
        }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut h = DefaultHasher::new();
            word.to_lowercase().hash(&mut h);
            let idx = (h.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl EmbeddingsProvider for HashEmbedder {
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        Box::pin(async move { Ok(self.vector(text)) })
    }

    fn embed_texts<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move { Ok(texts.iter().map(|t| self.vector(t)).collect()) })
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deterministic_and_normalized() {
        let e = HashEmbedder::new("h", 32);
        let a = e.embed_query("EGFR kinase").await.unwrap();
        let b = e.embed_query("egfr KINASE").await.unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn batch_matches_single() {
        let e = HashEmbedder::new("h", 16);
        let texts = vec!["alpha".to_string(), "beta gamma".to_string()];
        let batch = e.embed_texts(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], e.vector("beta gamma"));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashEmbedder::new("h", 4);
        assert_eq!(e.vector(""), vec![0.0; 4]);
    }
}
