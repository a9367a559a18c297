//! Token counting
//!
//! One `TokenCounter` instance is shared by the segmenter and the context
//! assembler so that chunk budgets and context budgets are measured in the
//! same unit.

pub mod counter;
pub mod hf;

use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;

pub use counter::HeuristicCounter;
pub use hf::HfTokenCounter;

/// Config value selecting the character heuristic
pub const HEURISTIC: &str = "heuristic";

/// Deterministic token-counting interface
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`, without special tokens
    fn count(&self, text: &str) -> Result<usize>;

    /// Human-readable name of the counting scheme
    fn name(&self) -> &str;
}

/// Resolve a counter from config: `"heuristic"`, a local `tokenizer.json`
/// path, or a Hugging Face Hub repository id.
pub fn load_counter(spec: &str) -> Result<Arc<dyn TokenCounter>> {
    if spec == HEURISTIC {
        return Ok(Arc::new(HeuristicCounter::new()));
    }

    let path = Path::new(spec);
    if path.is_file() {
        return Ok(Arc::new(HfTokenCounter::from_file(path)?));
    }

    Ok(Arc::new(HfTokenCounter::from_pretrained(spec)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_heuristic_counter() {
        let counter = load_counter(HEURISTIC).unwrap();
        assert_eq!(counter.name(), HEURISTIC);
        assert_eq!(counter.count("abcd").unwrap(), 1);
    }
}
