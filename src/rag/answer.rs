// Grounded answer generation over assembled context
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::Result;
use crate::generation::Generator;
use crate::rag::context::{ContextAssembler, ANSWER_MARKER, FALLBACK_ANSWER};
use crate::types::{Candidate, Citation};

/// Answer text plus the citations of the evidence it was generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Citation>,
}

impl Answer {
    /// Answer used when no evidence is available
    pub fn fallback() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }
}

/// Produces answers from a question and ranked candidates
pub struct QaEngine {
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    max_context_tokens: usize,
    max_new_tokens: usize,
}

impl QaEngine {
    pub fn new(
        assembler: ContextAssembler,
        generator: Arc<dyn Generator>,
        max_context_tokens: usize,
        max_new_tokens: usize,
    ) -> Self {
        Self {
            assembler,
            generator,
            max_context_tokens,
            max_new_tokens,
        }
    }

    /// Answer `question` using only the evidence in `candidates`
    ///
    /// The generator is not called when nothing survives trimming. Sources
    /// are the citations of the trimmed evidence, in prompt order.
    pub async fn generate_answer(&self, question: &str, candidates: &[Candidate]) -> Result<Answer> {
        let selected = self
            .assembler
            .trim_context(candidates, self.max_context_tokens)?;

        if selected.is_empty() {
            tracing::info!("No evidence for question, returning fallback answer");
            return Ok(Answer::fallback());
        }

        let context = self.assembler.build_context(&selected);
        let prompt = self.assembler.build_prompt(question, &context);

        let raw = self.generator.generate(&prompt, self.max_new_tokens).await?;
        let answer = extract_answer(&raw);

        let sources = selected
            .iter()
            .map(|c| ContextAssembler::format_source(c.metadata()))
            .collect();

        tracing::debug!(
            model = self.generator.model_name(),
            evidence = selected.len(),
            "Generated answer"
        );

        Ok(Answer { answer, sources })
    }
}

/// Text after the last answer marker, trimmed; the whole output if absent
pub fn extract_answer(raw: &str) -> String {
    let tail = match raw.rfind(ANSWER_MARKER) {
        Some(pos) => &raw[pos + ANSWER_MARKER.len()..],
        None => raw,
    };
    tail.trim().to_string()
}
