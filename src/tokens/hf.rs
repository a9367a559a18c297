// Token counting with a Hugging Face tokenizer
use anyhow::Context;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::Path;
use tokenizers::Tokenizer;

use crate::errors::{RagError, Result};
use crate::tokens::TokenCounter;

/// Counts tokens with the same vocabulary the generator uses
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
    name: String,
}

impl HfTokenCounter {
    /// Load from a local `tokenizer.json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_file(path)
            .map_err(|e| RagError::TokenizerError(format!("{}: {}", path.display(), e)))?;

        // Counts must cover the whole text: no truncation, no padding
        tokenizer
            .with_truncation(None)
            .map_err(|e| RagError::TokenizerError(format!("Failed to disable truncation: {}", e)))?;
        tokenizer.with_padding(None);

        Ok(Self {
            tokenizer,
            name: path.display().to_string(),
        })
    }

    /// Download `tokenizer.json` from a Hub repository (cached after first use)
    pub fn from_pretrained(repo_id: &str) -> Result<Self> {
        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));
        let tokenizer_path = repo
            .get("tokenizer.json")
            .with_context(|| format!("Failed to download tokenizer for {}", repo_id))?;

        let mut counter = Self::from_file(&tokenizer_path)?;
        counter.name = repo_id.to_string();
        Ok(counter)
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| RagError::TokenizerError(e.to_string()))?;
        Ok(encoding.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_tokenizer_error() {
        let result = HfTokenCounter::from_file(Path::new("/nonexistent/tokenizer.json"));
        assert!(matches!(result, Err(RagError::TokenizerError(_))));
    }

    /// Word-level tokenizer that ships truncation at 8 and fixed padding to 16
    const CAPPED_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": {"direction": "Right", "max_length": 8, "strategy": "LongestFirst", "stride": 0},
        "padding": {
            "strategy": {"Fixed": 16},
            "direction": "Right",
            "pad_to_multiple_of": null,
            "pad_id": 0,
            "pad_type_id": 0,
            "pad_token": "[PAD]"
        },
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {"type": "WordLevel", "vocab": {"[PAD]": 0, "[UNK]": 1, "risk": 2}, "unk_token": "[UNK]"}
    }"#;

    fn capped_counter(dir: &tempfile::TempDir) -> HfTokenCounter {
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, CAPPED_TOKENIZER).unwrap();
        HfTokenCounter::from_file(&path).unwrap()
    }

    #[test]
    fn test_stored_truncation_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let counter = capped_counter(&dir);

        let page = vec!["risk"; 100].join(" ");
        assert_eq!(counter.count(&page).unwrap(), 100);
    }

    #[test]
    fn test_stored_padding_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let counter = capped_counter(&dir);

        assert_eq!(counter.count("risk risk risk").unwrap(), 3);
    }

    #[test]
    fn test_budget_holds_with_capped_tokenizer() {
        use crate::segment::{SegmentConfig, Segmenter};
        use crate::types::Page;
        use std::sync::Arc;

        let dir = tempfile::TempDir::new().unwrap();
        let config = SegmentConfig {
            chunk_size: 20,
            chunk_overlap: 0,
            ..SegmentConfig::default()
        };
        let segmenter = Segmenter::new(config, Arc::new(capped_counter(&dir))).unwrap();

        let page = vec!["risk"; 100].join(" ");
        let pages = vec![Page::new(1, page.clone()), Page::new(2, page)];
        let chunks = segmenter.segment(&pages, "acme", "acme.txt").unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].metadata.page_start, 2);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_counts_without_special_tokens() {
        let counter = HfTokenCounter::from_pretrained("BAAI/bge-base-en-v1.5").unwrap();
        assert_eq!(counter.count("").unwrap(), 0);
        assert!(counter.count("Risk factors").unwrap() >= 2);
    }
}
