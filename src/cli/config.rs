//! Configuration management for filingqa
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.filingqa/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embedding::Pooling;
use crate::errors::{RagError, Result};
use crate::generation::GenerationConfig;
use crate::index::{IndexOptions, DEFAULT_QUERY_PREFIX};
use crate::rag::{ReRankConfig, RetrievalConfig};
use crate::segment::SegmentConfig;
use crate::tokens::HEURISTIC;

/// Complete configuration for filingqa
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub segment: SegmentConfig,
    pub tokens: TokensConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub rerank: ReRankConfig,
    pub generation: GenerationConfig,
}

/// File system paths, relative to the working directory unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: String,
    pub document_extension: String,
    pub index: String,
    pub metadata: String,
    pub questions: String,
    pub output: String,
}

/// Token counting scheme shared by segmentation and context assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    /// `"heuristic"`, a `tokenizer.json` path, or a Hub repository id
    pub tokenizer: String,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub revision: String,
    /// Expected vector dimension; checked against the loaded model
    pub dimension: usize,
    pub batch_size: usize,
    pub pooling: Pooling,
    pub query_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            document_extension: "txt".to_string(),
            index: "sec_10k.index".to_string(),
            metadata: "sec_10k_metadata.json".to_string(),
            questions: "questions/questions.json".to_string(),
            output: "output/answers.json".to_string(),
        }
    }
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            tokenizer: HEURISTIC.to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "BAAI/bge-base-en-v1.5".to_string(),
            revision: "main".to_string(),
            dimension: 768,
            batch_size: 32,
            pooling: Pooling::Cls,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
        }
    }
}

impl EmbeddingConfig {
    /// Build and query options for the vector index
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            batch_size: self.batch_size,
            query_prefix: self.query_prefix.clone(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// `~/.filingqa/config.toml`, when a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".filingqa").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let segment = &self.segment;
        if segment.chunk_size == 0 {
            return Err(RagError::ConfigError(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if segment.chunk_overlap >= segment.chunk_size {
            return Err(RagError::ConfigError(
                "chunk_overlap must be less than chunk_size".to_string(),
            ));
        }

        if segment.heading_scan_lines == 0 {
            return Err(RagError::ConfigError(
                "heading_scan_lines must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimension == 0 || self.embedding.batch_size == 0 {
            return Err(RagError::ConfigError(
                "embedding dimension and batch_size must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(RagError::ConfigError(
                "retrieval top_k must be greater than 0".to_string(),
            ));
        }

        if self.rerank.top_k == 0 {
            return Err(RagError::ConfigError(
                "rerank top_k must be greater than 0".to_string(),
            ));
        }

        if self.rerank.candidates < self.rerank.top_k {
            return Err(RagError::ConfigError(format!(
                "rerank candidates ({}) must be at least rerank top_k ({})",
                self.rerank.candidates, self.rerank.top_k
            )));
        }

        if self.generation.max_context_tokens == 0 || self.generation.max_new_tokens == 0 {
            return Err(RagError::ConfigError(
                "max_context_tokens and max_new_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Pretty TOML rendering of the effective configuration
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.data_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.index)
    }

    pub fn metadata_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.metadata)
    }

    pub fn questions_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.questions)
    }

    pub fn output_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.output)
    }
}
