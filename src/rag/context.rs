// Token-budgeted context assembly and prompt construction
use std::sync::Arc;

use crate::errors::Result;
use crate::tokens::TokenCounter;
use crate::types::{Candidate, ChunkMetadata, Citation};

/// Answer emitted when the sources do not contain the information
pub const FALLBACK_ANSWER: &str = "Not specified in the document.";

/// Marker after which the generator writes its answer
pub const ANSWER_MARKER: &str = "Answer:";

/// Selects evidence under a token budget and renders it for the generator
pub struct ContextAssembler {
    counter: Arc<dyn TokenCounter>,
}

impl ContextAssembler {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    /// Greedy prefix of `candidates` within `max_tokens`
    ///
    /// Blank candidates are skipped. Selection stops at the first candidate
    /// that does not fit, except that the first non-blank candidate is
    /// always kept even when it alone exceeds the budget.
    pub fn trim_context(&self, candidates: &[Candidate], max_tokens: usize) -> Result<Vec<Candidate>> {
        let mut selected = Vec::new();
        let mut total_tokens = 0;

        for candidate in candidates {
            let text = candidate.text().trim();
            if text.is_empty() {
                continue;
            }

            let tokens = self.counter.count(text)?;

            if total_tokens + tokens > max_tokens {
                if selected.is_empty() {
                    selected.push(candidate.clone());
                }
                break;
            }

            selected.push(candidate.clone());
            total_tokens += tokens;
        }

        tracing::debug!(
            selected = selected.len(),
            offered = candidates.len(),
            tokens = total_tokens,
            "Trimmed context"
        );

        Ok(selected)
    }

    /// Citation for a chunk: `[document, item, p.<page>]`
    pub fn format_source(metadata: &ChunkMetadata) -> Citation {
        Citation::from_metadata(metadata)
    }

    /// Numbered evidence blocks in selection order
    pub fn build_context(&self, chunks: &[Candidate]) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(idx, candidate)| {
                format!(
                    "[{}] {}\nSource: {}",
                    idx + 1,
                    candidate.text(),
                    Self::format_source(candidate.metadata())
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Instruction prompt constraining the generator to the given sources
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        format!(
            r#"You are a financial and legal analysis assistant.

Rules:
1. Use ONLY the information in the Sources.
2. Cite every fact.
3. If not found, say: "{fallback}"

Sources:
{context}

Question:
{question}

{marker}"#,
            fallback = FALLBACK_ANSWER,
            context = context,
            question = question,
            marker = ANSWER_MARKER,
        )
    }
}
