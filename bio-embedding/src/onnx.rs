//! Local ONNX Runtime inference for BERT-family biomedical models.
//!
//! The model directory must contain:
//! - `model.onnx`: exported encoder taking `input_ids`, `attention_mask`, `token_type_ids`
//! - `tokenizer.json`: HuggingFace tokenizer definition
//!
//! Output `[1, seq_len, hidden]` is mean-pooled over the attention mask and L2-normalized.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use ort::session::Session;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

use crate::{
    errors::EmbeddingError,
    ollama::PROBE_TEXT,
    provider::{EmbedFuture, EmbeddingsProvider, check_dim},
};

/// BERT positional limit.
const MAX_TOKENS: usize = 512;

struct OnnxModel {
    // `Session::run` takes `&mut self`
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

/// ONNX embedder. Cloning shares the session.
#[derive(Clone)]
pub struct OnnxEmbedder {
    model: Arc<OnnxModel>,
    name: String,
    dim: usize,
}

impl OnnxEmbedder {
    /// Loads `model.onnx` + `tokenizer.json` from `model_dir` and runs one probe inference.
    ///
    /// Blocking; call it from `spawn_blocking`.
    pub fn load(name: &str, model_dir: &Path) -> Result<Self, EmbeddingError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(EmbeddingError::ModelNotFound(model_path));
        }
        if !tokenizer_path.exists() {
            return Err(EmbeddingError::ModelNotFound(tokenizer_path));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| EmbeddingError::ModelInit(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| EmbeddingError::ModelInit(format!("ONNX load failed: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer load failed: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::ModelInit(format!("tokenizer truncation: {e}")))?;

        let model = Arc::new(OnnxModel {
            session: Mutex::new(session),
            tokenizer,
        });

        let probe = model.infer(PROBE_TEXT)?;
        info!(model = name, dir = %model_dir.display(), dim = probe.len(), "ONNX embedder loaded");

        Ok(Self {
            model,
            name: name.to_string(),
            dim: probe.len(),
        })
    }

    async fn infer_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            texts.iter().map(|t| model.infer(t)).collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| EmbeddingError::Inference(format!("inference task failed: {e}")))?
    }
}

impl OnnxModel {
    fn infer(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        use ort::value::TensorRef;

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Inference(format!("tokenization: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let seq_len = input_ids.len();
        let shape_err = |e: ndarray::ShapeError| EmbeddingError::Inference(e.to_string());

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids).map_err(shape_err)?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(shape_err)?;
        let type_array =
            ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids).map_err(shape_err)?;

        let tensor_err = |e: ort::Error| EmbeddingError::Inference(e.to_string());
        let ids_tensor = TensorRef::from_array_view(&ids_array).map_err(tensor_err)?;
        let mask_tensor = TensorRef::from_array_view(&mask_array).map_err(tensor_err)?;
        let type_tensor = TensorRef::from_array_view(&type_array).map_err(tensor_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::Inference("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
            .map_err(|e| EmbeddingError::Inference(format!("ONNX run failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::Inference(format!("output extraction: {e}")))?;

        if shape.len() != 3 || shape[1] as usize != seq_len {
            return Err(EmbeddingError::Inference(format!(
                "unexpected output shape {shape:?}, expected [1, {seq_len}, hidden]"
            )));
        }
        let hidden = shape[2] as usize;

        Ok(mean_pool_normalized(data, &attention_mask, hidden))
    }
}

/// Attention-masked mean over tokens, then L2 normalization.
fn mean_pool_normalized(data: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut mask_sum = 0.0f32;

    for (token_idx, &m) in mask.iter().enumerate() {
        let m = m as f32;
        mask_sum += m;
        let offset = token_idx * hidden;
        for (dim_idx, p) in pooled.iter_mut().enumerate() {
            *p += data[offset + dim_idx] * m;
        }
    }

    if mask_sum > 0.0 {
        for v in &mut pooled {
            *v /= mask_sum;
        }
    }

    let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut pooled {
            *v /= norm;
        }
    }
    pooled
}

impl EmbeddingsProvider for OnnxEmbedder {
    fn embed_query<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        Box::pin(async move {
            let mut out = self.infer_blocking(vec![text.to_string()]).await?;
            let v = out
                .pop()
                .ok_or_else(|| EmbeddingError::Inference("no output vector".into()))?;
            check_dim(&v, self.dim)?;
            Ok(v)
        })
    }

    fn embed_texts<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move { self.infer_blocking(texts.to_vec()).await })
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
