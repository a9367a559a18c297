//! Ollama generation client
//!
//! Non-streaming POST /api/generate with temperature 0 so that answers
//! are reproducible for a given model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{RagError, Result};
use crate::generation::Generator;

/// Default Ollama host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Ollama port
pub const DEFAULT_PORT: u16 = 11434;

/// Default generation model
pub const DEFAULT_MODEL: &str = "phi3:mini";

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    /// Generation length limit
    pub max_new_tokens: usize,
    /// Evidence token budget for one prompt
    pub max_context_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            max_new_tokens: 120,
            max_context_tokens: 1800,
            timeout_secs: 600,
        }
    }
}

impl GenerationConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Ollama-backed generator
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Self::with_config(
            &config.base_url(),
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: max_new_tokens,
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::GenerationError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::GenerationError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::GenerationError(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(RagError::GenerationError(error));
        }

        Ok(body.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}
