// Embedding engine - local BERT-family embeddings via Candle
use anyhow::{Context, Result as AnyResult};
use candle_core::{Device, Tensor};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;

use crate::embedding::loader::{pad_batch, ModelFiles};
use crate::embedding::{l2_normalize, Embedder, Pooling};
use crate::errors::{RagError, Result};

/// Embedding engine using a BERT-family model (e.g. BGE) via Candle
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    pooling: Pooling,
    dimension: usize,
    model_id: String,
}

impl CandleEmbedder {
    /// Create new embedding engine (downloads model on first use)
    pub fn new(model_id: &str, revision: &str, pooling: Pooling) -> Result<Self> {
        Ok(Self::load(model_id, revision, pooling)?)
    }

    fn load(model_id: &str, revision: &str, pooling: Pooling) -> AnyResult<Self> {
        // CPU only; placement is a property of the model backend
        let device = Device::Cpu;

        let files = ModelFiles::download(model_id, revision)?;
        let config = files.load_config()?;
        let tokenizer = files.load_tokenizer()?;
        let vb = files.var_builder(&device)?;

        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        tracing::info!(model = model_id, dimension = config.hidden_size, "Loaded embedding model");

        Ok(Self {
            model,
            tokenizer,
            device,
            pooling,
            dimension: config.hidden_size,
            model_id: model_id.to_string(),
        })
    }

    /// Forward pass and pooling for one batch
    fn embed_batch(&self, texts: &[&str]) -> AnyResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let (flat_ids, max_len) = pad_batch(encodings.iter().map(|e| e.get_ids().to_vec()).collect());
        let (flat_types, _) = pad_batch(encodings.iter().map(|e| e.get_type_ids().to_vec()).collect());
        let (flat_mask, _) = pad_batch(encodings.iter().map(|e| e.get_attention_mask().to_vec()).collect());

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(flat_types, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = match self.pooling {
            Pooling::Cls => hidden.narrow(1, 0, 1)?.squeeze(1)?,
            Pooling::Mean => Self::mean_pool(&hidden, &attention_mask)?,
        };

        Ok(pooled.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> AnyResult<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }
}

impl Embedder for CandleEmbedder {
    fn encode(&self, texts: &[&str], normalize: bool) -> Result<Vec<Vec<f32>>> {
        let mut vectors = self
            .embed_batch(texts)
            .map_err(|e| RagError::EmbeddingError(format!("{:#}", e)))?;

        if normalize {
            vectors.iter_mut().for_each(|v| l2_normalize(v));
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::dot;

    const MODEL: &str = "BAAI/bge-base-en-v1.5";

    #[test]
    #[ignore]  // Integration test - requires model download
    fn test_embedding_dimension() {
        let engine = CandleEmbedder::new(MODEL, "main", Pooling::Cls).unwrap();
        assert_eq!(engine.dimension(), 768);
    }

    #[test]
    #[ignore]  // Integration test - requires model download
    fn test_embed_batch_normalized() {
        let engine = CandleEmbedder::new(MODEL, "main", Pooling::Cls).unwrap();
        let vectors = engine.encode(&["Risk factors", "Legal proceedings"], true).unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 768));
        assert!((dot(&vectors[0], &vectors[0]) - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]  // Integration test - requires model download
    fn test_embed_empty_batch() {
        let engine = CandleEmbedder::new(MODEL, "main", Pooling::Mean).unwrap();
        assert!(engine.encode(&[], true).unwrap().is_empty());
    }
}
