// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the ONNX embedding model.

use std::path::{Path, PathBuf};

use recall_core::RecallError;
use tracing::info;

use crate::embedder::ONNX_MODEL_ID;

const MODEL_URL: &str =
    "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Resolves and fetches model files under `embedding.model_dir`.
pub struct ModelManager {
    root: PathBuf,
}

impl ModelManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub fn model_dir(&self) -> PathBuf {
        self.root.join(ONNX_MODEL_ID)
    }

    pub fn is_model_available(&self) -> bool {
        let dir = self.model_dir();
        dir.join("model.onnx").exists() && dir.join("tokenizer.json").exists()
    }

    /// Download any missing file and return the model directory.
    pub async fn ensure_model(&self) -> Result<PathBuf, RecallError> {
        let dir = self.model_dir();
        if self.is_model_available() {
            return Ok(dir);
        }

        info!(dir = %dir.display(), "embedding model not found, downloading");
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            RecallError::Internal(format!("cannot create {}: {e}", dir.display()))
        })?;

        for (file, url) in [("model.onnx", MODEL_URL), ("tokenizer.json", TOKENIZER_URL)] {
            let dest = dir.join(file);
            if dest.exists() {
                continue;
            }
            match download(url, &dest).await {
                Ok(bytes) => info!(file, bytes, "downloaded"),
                Err(e) => {
                    let _ = tokio::fs::remove_file(&dest).await;
                    return Err(e);
                }
            }
        }

        Ok(dir)
    }
}

async fn download(url: &str, dest: &Path) -> Result<usize, RecallError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| RecallError::Internal(format!("download of {url} failed: {e}")))?;
    if !response.status().is_success() {
        return Err(RecallError::Internal(format!(
            "download of {url} returned {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| RecallError::Internal(format!("reading {url} failed: {e}")))?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| RecallError::Internal(format!("writing {} failed: {e}", dest.display())))?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_dir_is_named_after_model() {
        let mgr = ModelManager::new("/data/models");
        assert_eq!(mgr.model_dir(), PathBuf::from("/data/models/all-MiniLM-L6-v2"));
    }

    #[test]
    fn missing_files_are_unavailable() {
        assert!(!ModelManager::new("/nonexistent/recall").is_model_available());
    }
}
