// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with SHA-256 into one of
//! `dimensions` buckets with a +1/-1 sign, and the resulting bag-of-words
//! vector is L2-normalized. Deterministic across processes and platforms, so
//! vectors written by one run stay comparable with queries from the next.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use recall_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use recall_core::{EmbeddingAdapter, PluginAdapter, RecallError};

use crate::similarity::l2_normalize;

/// Local embedder that needs no model files.
pub struct HashingEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashingEmbedder {
    /// Creates an embedder producing vectors of `dimensions` components.
    pub fn new(dimensions: usize) -> Result<Self, RecallError> {
        if dimensions == 0 {
            return Err(RecallError::Config(
                "hashing embedder needs at least one dimension".into(),
            ));
        }
        Ok(Self {
            dimensions,
            model_id: format!("hashing-bow-{dimensions}"),
        })
    }

    /// Embed one text.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(head) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }
        l2_normalize(&mut vec);
        vec
    }
}

/// Split on anything that is not alphanumeric and lowercase the pieces.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        let embeddings = input.texts.iter().map(|t| self.embed_text(t)).collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;

    fn embedder() -> HashingEmbedder {
        HashingEmbedder::new(1024).unwrap()
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            HashingEmbedder::new(0),
            Err(RecallError::Config(_))
        ));
    }

    #[test]
    fn model_id_includes_dimensions() {
        assert_eq!(embedder().model_id(), "hashing-bow-1024");
    }

    #[test]
    fn tokenize_splits_and_lowercases() {
        let tokens: Vec<String> = tokenize("Hello, World! it's 2pm").collect();
        assert_eq!(tokens, vec!["hello", "world", "it", "s", "2pm"]);
    }

    #[test]
    fn output_is_deterministic_and_unit_length() {
        let e = embedder();
        let a = e.embed_text("the quick brown fox");
        let b = e.embed_text("the quick brown fox");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let e = embedder();
        assert_eq!(e.embed_text("Hello world"), e.embed_text("hello, WORLD!"));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = embedder().embed_text("   ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn overlapping_texts_score_higher() {
        let e = embedder();
        let query = e.embed_text("hello");
        let related = e.embed_text("hello world");
        let unrelated = e.embed_text("goodbye moon");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[tokio::test]
    async fn embed_batch_preserves_order() {
        let e = embedder();
        let out = e
            .embed(EmbeddingInput {
                texts: vec!["one".into(), "two".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.dimensions, 1024);
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.embeddings[0], e.embed_text("one"));
        assert_eq!(out.embeddings[1], e.embed_text("two"));
    }
}
