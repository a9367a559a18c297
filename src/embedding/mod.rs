//! Text embeddings
//!
//! The embedding function is injected as `Arc<dyn Embedder>`. The index
//! only relies on the trait: fixed dimension, deterministic output, and
//! unit-length vectors when `normalize` is set.

pub mod engine;
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use engine::CandleEmbedder;
pub use loader::ModelFiles;

/// Embedding interface
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts; output order matches input order
    fn encode(&self, texts: &[&str], normalize: bool) -> Result<Vec<Vec<f32>>>;

    /// Number of components in every vector
    fn dimension(&self) -> usize;

    /// Model identifier recorded alongside persisted indexes
    fn model_name(&self) -> &str;

    /// Embed a single text
    fn encode_one(&self, text: &str, normalize: bool) -> Result<Vec<f32>> {
        let mut vectors = self.encode(&[text], normalize)?;
        vectors.pop().ok_or_else(|| {
            crate::errors::RagError::EmbeddingError("embedder returned no vector".to_string())
        })
    }
}

/// How token states are reduced to one vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// First ([CLS]) token state
    Cls,
    /// Attention-masked mean over all token states
    Mean,
}

impl Default for Pooling {
    fn default() -> Self {
        Pooling::Cls
    }
}

/// Scale `vector` to unit L2 norm in place; zero vectors stay zero
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Inner product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        l2_normalize(&mut v);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_pooling_from_config_string() {
        let pooling: Pooling = serde_json::from_str("\"mean\"").unwrap();
        assert_eq!(pooling, Pooling::Mean);
        assert_eq!(Pooling::default(), Pooling::Cls);
    }
}
