// Second-stage relevance reranking
pub mod cross_encoder;
pub mod scorer;

pub use cross_encoder::CrossEncoderScorer;
pub use scorer::{ReRankConfig, Reranker, RelevanceScorer};
