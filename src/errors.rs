//! Error types for filingqa
//!
//! One error enum for the whole pipeline. External-interface failures
//! (embedding, scoring, generation) are surfaced, never retried.

use thiserror::Error;

/// Main error type for the retrieval pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Tokenizer loading or encoding errors
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    /// Embedding interface failures
    #[error("Embedding failed: {0}")]
    EmbeddingError(String),

    /// Relevance-scoring interface failures
    #[error("Relevance scoring failed: {0}")]
    ScoringError(String),

    /// Generation interface failures
    #[error("Generation failed: {0}")]
    GenerationError(String),

    /// Vector has the wrong number of components for the index
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted index or metadata artifact is unreadable or inconsistent
    #[error("Index artifact corrupt: {0}")]
    IndexCorrupt(String),

    /// Persisted artifact written by an incompatible schema version
    #[error("Unsupported artifact schema version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Caller passed an argument outside the operation's domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Convert anyhow errors (model loading) to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(format!("{:#}", err))
    }
}
