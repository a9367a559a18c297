// Re-ranking retrieved candidates with an external relevance scorer
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::{RagError, Result};
use crate::types::Candidate;

/// Relevance-scoring interface: higher = more relevant
pub trait RelevanceScorer: Send + Sync {
    /// One score per text, in input order
    fn score(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>>;
}

/// Re-ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReRankConfig {
    /// Rerank retrieved candidates before context assembly
    pub enabled: bool,
    /// Cross-encoder model on the Hugging Face Hub
    pub model_id: String,
    /// Candidates retrieved from the index when reranking
    pub candidates: usize,
    /// Candidates kept after reranking
    pub top_k: usize,
}

impl Default for ReRankConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_id: "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string(),
            candidates: 20,
            top_k: 5,
        }
    }
}

/// Re-ranker for improving retrieval results
pub struct Reranker {
    scorer: Arc<dyn RelevanceScorer>,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Score every candidate against `query` and keep the best `top_k`
    ///
    /// Candidates are returned unchanged apart from `rerank_score`. Equal
    /// scores keep their incoming order.
    pub fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let texts: Vec<&str> = candidates.iter().map(|c| c.text()).collect();
        let scores = self.scorer.score(query, &texts)?;

        if scores.len() != candidates.len() {
            return Err(RagError::ScoringError(format!(
                "scored {} of {} candidates",
                scores.len(),
                candidates.len()
            )));
        }

        let mut ranked: Vec<Candidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(mut candidate, score)| {
                candidate.rerank_score = Some(score);
                candidate
            })
            .collect();

        // Sort by rerank score descending
        ranked.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));
        ranked.truncate(top_k);

        tracing::debug!(kept = ranked.len(), "Reranked candidates");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkMetadata, ItemTag};

    /// Scores by how often the query occurs in the text
    struct OccurrenceScorer;

    impl RelevanceScorer for OccurrenceScorer {
        fn score(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>> {
            Ok(texts.iter().map(|t| t.matches(query).count() as f32).collect())
        }
    }

    struct FailingScorer;

    impl RelevanceScorer for FailingScorer {
        fn score(&self, _query: &str, _texts: &[&str]) -> Result<Vec<f32>> {
            Err(RagError::ScoringError("model unavailable".to_string()))
        }
    }

    fn create_candidate(text: &str, page: u32, score: f32) -> Candidate {
        Candidate::new(
            Chunk {
                text: text.to_string(),
                metadata: ChunkMetadata {
                    document: "acme".to_string(),
                    item: ItemTag::known("ITEM 7."),
                    page_start: page,
                    page_end: page,
                    source: "data/acme.txt".to_string(),
                    page: None,
                },
            },
            score,
        )
    }

    fn reranker() -> Reranker {
        Reranker::new(Arc::new(OccurrenceScorer))
    }

    #[test]
    fn test_rerank_sorts_by_score() {
        let candidates = vec![
            create_candidate("revenue", 1, 0.9),
            create_candidate("revenue revenue revenue", 2, 0.5),
            create_candidate("revenue revenue", 3, 0.7),
        ];

        let ranked = reranker().rerank("revenue", candidates, 3).unwrap();

        let pages: Vec<u32> = ranked.iter().map(|c| c.metadata().page_start).collect();
        assert_eq!(pages, vec![2, 3, 1]);
        assert!(ranked.windows(2).all(|w| w[0].relevance() >= w[1].relevance()));
    }

    #[test]
    fn test_rerank_truncates_to_top_k() {
        let candidates = vec![
            create_candidate("debt", 1, 0.1),
            create_candidate("debt debt", 2, 0.2),
            create_candidate("none", 3, 0.3),
        ];

        let ranked = reranker().rerank("debt", candidates, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].metadata().page_start, 2);
    }

    #[test]
    fn test_rerank_top_k_larger_than_input() {
        let candidates = vec![create_candidate("x", 1, 0.1)];
        assert_eq!(reranker().rerank("x", candidates, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_rerank_preserves_fields() {
        let original = create_candidate("lease obligations", 9, 0.42);
        let ranked = reranker().rerank("lease", vec![original.clone()], 1).unwrap();

        assert_eq!(ranked[0].chunk, original.chunk);
        assert_eq!(ranked[0].score, 0.42);
        assert_eq!(ranked[0].rerank_score, Some(1.0));
    }

    #[test]
    fn test_rerank_empty_input() {
        let ranked = reranker().rerank("anything", Vec::new(), 5).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_scorer_failure_is_surfaced() {
        let ranker = Reranker::new(Arc::new(FailingScorer));
        let result = ranker.rerank("q", vec![create_candidate("t", 1, 0.1)], 1);
        assert!(matches!(result, Err(RagError::ScoringError(_))));
    }

    #[test]
    fn test_rerank_config_default() {
        let config = ReRankConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.top_k, 5);
        assert!(config.candidates >= config.top_k);
    }
}
