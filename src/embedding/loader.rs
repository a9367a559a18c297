// Hugging Face Hub model downloads shared by the embedder and the cross-encoder
use anyhow::{Context, Result};
use candle_core::Device;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::Config;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::PathBuf;
use tokenizers::{Tokenizer, TruncationParams};

/// Longest input accepted by BERT-family encoders
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Local paths of a downloaded BERT-style checkpoint
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model_id: String,
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Download (or reuse cached) config, tokenizer and safetensors weights
    pub fn download(model_id: &str, revision: &str) -> Result<Self> {
        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        Ok(Self {
            model_id: model_id.to_string(),
            config,
            tokenizer,
            weights,
        })
    }

    pub fn load_config(&self) -> Result<Config> {
        let contents = std::fs::read_to_string(&self.config)
            .context("Failed to read config file")?;
        serde_json::from_str(&contents).context("Failed to parse model config")
    }

    /// Tokenizer truncating to the encoder's maximum length, no padding
    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        let mut tokenizer = Tokenizer::from_file(&self.tokenizer)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        Ok(tokenizer)
    }

    /// Memory-mapped weights
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[self.weights.clone()],
                candle_core::DType::F32,
                device,
            ).context("Failed to load model weights")?
        };
        Ok(vb)
    }
}

/// Right-pad token id rows to a common length
pub fn pad_batch(rows: Vec<Vec<u32>>) -> (Vec<u32>, usize) {
    let max_len = rows.iter().map(|ids| ids.len()).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * max_len);

    for row in rows {
        let padding = max_len - row.len();
        flat.extend(row);
        flat.extend(std::iter::repeat(0u32).take(padding));
    }

    (flat, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_batch() {
        let (flat, width) = pad_batch(vec![vec![1, 2, 3], vec![4]]);
        assert_eq!(width, 3);
        assert_eq!(flat, vec![1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_pad_empty_batch() {
        let (flat, width) = pad_batch(Vec::new());
        assert_eq!(width, 0);
        assert!(flat.is_empty());
    }
}
