//! Local sentence-embedding provider running all-MiniLM-L6-v2 via ONNX Runtime.
//!
//! This module is only available when the `minilm` feature is enabled.
//!
//! Model weights and the tokenizer are fetched from the Hugging Face Hub on
//! first load (cached locally afterwards). Inference is in-process; there is
//! no network call on the embed path.

use std::collections::HashMap;

use async_trait::async_trait;
use ndarray::Array2;
use ort::{session::Session, value::Value};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Hugging Face repository of the embedding model.
const MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimensionality of all-MiniLM-L6-v2.
const DIMENSIONS: usize = 384;

fn embed_err(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: "MiniLM".into(), message: message.into() }
}

/// An [`EmbeddingProvider`] that runs `sentence-transformers/all-MiniLM-L6-v2`
/// locally through `ort`.
///
/// Produces 384-dimensional, L2-normalized sentence embeddings using
/// attention-masked mean pooling, matching the sentence-transformers
/// reference pipeline. Embeddings are deterministic for a given input.
///
/// The ONNX session requires exclusive access, so it sits behind an async
/// mutex; concurrent embed calls serialize on it.
pub struct MiniLmEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl MiniLmEmbedder {
    /// Download (or reuse the cached copy of) the model and tokenizer from
    /// the Hugging Face Hub and load the ONNX session.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the download fails or the
    /// model cannot be loaded. This is fatal to startup: the service runs
    /// without an initialized assistant if the model is unavailable.
    pub async fn load() -> Result<Self> {
        let api = hf_hub::api::tokio::Api::new()
            .map_err(|e| embed_err(format!("failed to initialize Hugging Face API: {e}")))?;
        let repo = api.model(MODEL_REPO.to_string());

        info!(model = MODEL_REPO, "fetching embedding model files");
        let tokenizer_file = repo
            .get("tokenizer.json")
            .await
            .map_err(|e| embed_err(format!("failed to fetch tokenizer: {e}")))?;
        let model_file = repo
            .get("onnx/model.onnx")
            .await
            .map_err(|e| embed_err(format!("failed to fetch model weights: {e}")))?;

        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| embed_err(format!("failed to load tokenizer: {e}")))?;

        let session = Session::builder()
            .map_err(|e| embed_err(format!("failed to create session builder: {e}")))?
            .commit_from_file(model_file)
            .map_err(|e| embed_err(format!("failed to load ONNX model: {e}")))?;

        info!(model = MODEL_REPO, dimensions = DIMENSIONS, "embedding model loaded");

        Ok(Self { session: Mutex::new(session), tokenizer })
    }
}

#[async_trait]
impl EmbeddingProvider for MiniLmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "MiniLM", text_len = text.len(), "embedding text");

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| embed_err(format!("tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let attention_mask: Vec<i64> =
            encoding.get_attention_mask().iter().map(|&x| x as i64).collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&x| x as i64).collect();

        let seq_len = input_ids.len();
        let mask = attention_mask.clone();

        let shape_err = |e| embed_err(format!("failed to shape input tensor: {e}"));
        let tensor_err = |e| embed_err(format!("failed to build input tensor: {e}"));

        let input_ids_array: Array2<i64> =
            Array2::from_shape_vec((1, seq_len), input_ids).map_err(shape_err)?;
        let attention_mask_array: Array2<i64> =
            Array2::from_shape_vec((1, seq_len), attention_mask).map_err(shape_err)?;
        let token_type_ids_array: Array2<i64> =
            Array2::from_shape_vec((1, seq_len), token_type_ids).map_err(shape_err)?;

        let inputs = HashMap::from([
            ("input_ids", Value::from_array(input_ids_array).map_err(tensor_err)?),
            ("attention_mask", Value::from_array(attention_mask_array).map_err(tensor_err)?),
            ("token_type_ids", Value::from_array(token_type_ids_array).map_err(tensor_err)?),
        ]);

        let mut session = self.session.lock().await;
        let outputs =
            session.run(inputs).map_err(|e| embed_err(format!("inference failed: {e}")))?;

        // Token states come back as [batch, seq_len, hidden].
        let (shape, data) = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("0"))
            .ok_or_else(|| embed_err("model produced no output tensor"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| embed_err(format!("failed to read output tensor: {e}")))?;

        let seq_length = shape[1] as usize;
        let hidden_size = shape[2] as usize;
        if hidden_size != DIMENSIONS {
            return Err(embed_err(format!(
                "unexpected hidden size {hidden_size}, expected {DIMENSIONS}"
            )));
        }

        // Mean-pool token states under the attention mask.
        let mut pooled = vec![0.0f32; hidden_size];
        let mut token_count = 0.0f32;
        for token_idx in 0..seq_length {
            if mask.get(token_idx).copied().unwrap_or(0) == 0 {
                continue;
            }
            token_count += 1.0;
            let start = token_idx * hidden_size;
            for (i, &value) in data[start..start + hidden_size].iter().enumerate() {
                pooled[i] += value;
            }
        }
        if token_count > 0.0 {
            for value in pooled.iter_mut() {
                *value /= token_count;
            }
        }

        // L2-normalize, as the sentence-transformers pipeline does.
        let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in pooled.iter_mut() {
                *value /= norm;
            }
        }

        Ok(pooled)
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}
