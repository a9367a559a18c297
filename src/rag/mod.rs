// Retrieval-augmented answering over an indexed filing corpus
//
// Components:
// - Re-ranking: second-stage relevance scoring of retrieved candidates
// - Context: token-budgeted evidence selection and prompt construction
// - Answer: grounded generation with citations
// - Pipeline: end-to-end orchestration and batch I/O

pub mod answer;
pub mod context;
pub mod pipeline;
pub mod reranking;

// Re-export key types
pub use answer::{extract_answer, Answer, QaEngine};
pub use context::{ContextAssembler, ANSWER_MARKER, FALLBACK_ANSWER};
pub use pipeline::{read_questions, write_records, QaRecord, Question, RagPipeline, RetrievalConfig};
pub use reranking::{CrossEncoderScorer, ReRankConfig, Reranker, RelevanceScorer};
