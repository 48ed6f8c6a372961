// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX embedder running all-MiniLM-L6-v2 on CPU.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use recall_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use recall_core::{EmbeddingAdapter, PluginAdapter, RecallError};

use crate::similarity::l2_normalize;

/// Output width of all-MiniLM-L6-v2.
pub const ONNX_DIMENSIONS: usize = 384;

/// Identifier recorded on collections created with this embedder.
pub const ONNX_MODEL_ID: &str = "all-MiniLM-L6-v2";

fn embed_err(context: &str, e: impl std::fmt::Display) -> RecallError {
    RecallError::Embedding(format!("{context}: {e}"))
}

/// Sentence-transformer embedder backed by ONNX Runtime.
pub struct OnnxEmbedder {
    // Session::run needs &mut.
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// SAFETY: the session is only reached through the Mutex and the tokenizer is
// only used for encoding, which takes &self.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn new(model_dir: &Path) -> Result<Self, RecallError> {
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            RecallError::Config(format!(
                "cannot load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let model_path = model_dir.join("model.onnx");
        let session = Session::builder()
            .map_err(|e| embed_err("session builder", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| embed_err("optimization level", e))?
            .with_intra_threads(1)
            .map_err(|e| embed_err("thread count", e))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                RecallError::Config(format!(
                    "cannot load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| embed_err("tokenization", e))?;

        let to_i64 = |v: &[u32]| v.iter().map(|&x| x as i64).collect::<Vec<i64>>();
        let input_ids = to_i64(encoding.get_ids());
        let attention_mask = to_i64(encoding.get_attention_mask());
        let type_ids = to_i64(encoding.get_type_ids());
        let seq_len = input_ids.len();

        let shape = |v: Vec<i64>| {
            Array2::from_shape_vec((1, seq_len), v).map_err(|e| embed_err("input tensor", e))
        };
        let ids_array = shape(input_ids)?;
        let mask_array = shape(attention_mask.clone())?;
        let types_array = shape(type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| RecallError::Internal(format!("ONNX session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => TensorRef::from_array_view(&ids_array).map_err(|e| embed_err("input_ids", e))?,
                "attention_mask" => TensorRef::from_array_view(&mask_array).map_err(|e| embed_err("attention_mask", e))?,
                "token_type_ids" => TensorRef::from_array_view(&types_array).map_err(|e| embed_err("token_type_ids", e))?
            ])
            .map_err(|e| embed_err("inference", e))?;

        // [1, seq_len, hidden]
        let (out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| embed_err("output tensor", e))?;
        let hidden = out_shape[out_shape.len() - 1] as usize;

        let mut pooled = mean_pool(data, &attention_mask, seq_len, hidden);
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

/// Attention-masked mean over token embeddings.
fn mean_pool(embeddings: &[f32], mask: &[i64], seq_len: usize, hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (token, _) in mask.iter().enumerate().take(seq_len).filter(|(_, m)| **m > 0) {
        let row = &embeddings[token * hidden..(token + 1) * hidden];
        for (acc, v) in sum.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1.0;
    }
    if count > 0.0 {
        sum.iter_mut().for_each(|v| *v /= count);
    }
    sum
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(match self.session.lock() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("session lock poisoned: {e}")),
        })
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    fn model_id(&self) -> &str {
        ONNX_MODEL_ID
    }

    fn dimensions(&self) -> usize {
        ONNX_DIMENSIONS
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        let embeddings = input
            .texts
            .iter()
            .map(|t| self.embed_text(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: ONNX_DIMENSIONS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_skips_padding() {
        let embeddings = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        assert_eq!(mean_pool(&embeddings, &[0, 1], 2, 3), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_pool_averages_tokens() {
        let embeddings = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let pooled = mean_pool(&embeddings, &[1, 1, 1], 3, 2);
        assert!((pooled[0] - 3.0).abs() < f32::EPSILON);
        assert!((pooled[1] - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_model_files_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OnnxEmbedder::new(dir.path()),
            Err(RecallError::Config(_))
        ));
    }
}
