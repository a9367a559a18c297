// Cross-encoder relevance scoring via Candle
use anyhow::{Context, Result as AnyResult};
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;

use crate::embedding::loader::{pad_batch, ModelFiles};
use crate::errors::{RagError, Result};
use crate::rag::reranking::RelevanceScorer;

/// (query, passage) pairs per forward pass
const SCORE_BATCH: usize = 16;

/// BERT sequence classifier with a single relevance logit
/// (e.g. `cross-encoder/ms-marco-MiniLM-L-6-v2`)
pub struct CrossEncoderScorer {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl CrossEncoderScorer {
    /// Load the model (downloads on first use)
    pub fn new(model_id: &str, revision: &str) -> Result<Self> {
        Ok(Self::load(model_id, revision)?)
    }

    fn load(model_id: &str, revision: &str) -> AnyResult<Self> {
        let device = Device::Cpu;

        let files = ModelFiles::download(model_id, revision)?;
        let config = files.load_config()?;
        let tokenizer = files.load_tokenizer()?;
        let vb = files.var_builder(&device)?;

        let bert = BertModel::load(vb.clone(), &config)
            .context("Failed to create BERT encoder")?;
        let pooler = candle_nn::linear(config.hidden_size, config.hidden_size, vb.pp("bert.pooler.dense"))
            .context("Failed to load pooler")?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))
            .context("Failed to load classifier head")?;

        tracing::info!(model = model_id, "Loaded cross-encoder");

        Ok(Self {
            bert,
            pooler,
            classifier,
            tokenizer,
            device,
        })
    }

    fn score_batch(&self, query: &str, texts: &[&str]) -> AnyResult<Vec<f32>> {
        let pairs: Vec<(&str, &str)> = texts.iter().map(|t| (query, *t)).collect();
        let encodings = self.tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let (flat_ids, max_len) = pad_batch(encodings.iter().map(|e| e.get_ids().to_vec()).collect());
        let (flat_types, _) = pad_batch(encodings.iter().map(|e| e.get_type_ids().to_vec()).collect());
        let (flat_mask, _) = pad_batch(encodings.iter().map(|e| e.get_attention_mask().to_vec()).collect());

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(flat_types, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;

        let hidden = self.bert.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?.squeeze(1)?;

        Ok(logits.to_vec1::<f32>()?)
    }
}

impl RelevanceScorer for CrossEncoderScorer {
    fn score(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(texts.len());

        for batch in texts.chunks(SCORE_BATCH) {
            let batch_scores = self
                .score_batch(query, batch)
                .map_err(|e| RagError::ScoringError(format!("{:#}", e)))?;
            scores.extend(batch_scores);
        }

        Ok(scores)
    }
}
