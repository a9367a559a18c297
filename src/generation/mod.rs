//! Text generation interface
//!
//! The question-answering stage only needs "prompt in, text out" with a
//! length limit and deterministic decoding. `OllamaGenerator` talks to a
//! local Ollama server; tests substitute their own implementations.

pub mod ollama;

pub use ollama::{GenerationConfig, OllamaGenerator};

use async_trait::async_trait;

use crate::errors::Result;

/// Produces a completion for a prompt
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate at most `max_new_tokens` tokens with greedy decoding.
    /// The returned text may echo the prompt.
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
