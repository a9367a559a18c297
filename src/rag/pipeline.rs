// End-to-end question answering: retrieve -> rerank -> answer
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{RagError, Result};
use crate::index::VectorIndex;
use crate::rag::answer::QaEngine;
use crate::rag::reranking::{ReRankConfig, Reranker};
use crate::types::{Candidate, Citation};

/// First-stage retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates passed to answering when reranking is off
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// One batch input record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
}

/// One batch output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    pub sources: Vec<Citation>,
}

/// Read a JSON array of `{question}` records
pub fn read_questions(path: &Path) -> Result<Vec<Question>> {
    let contents = fs::read_to_string(path)?;
    let questions: Vec<Question> = serde_json::from_str(&contents)?;
    Ok(questions)
}

/// Write records as pretty JSON, creating the parent directory
pub fn write_records(path: &Path, records: &[QaRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

/// Retrieval pipeline over a loaded index
pub struct RagPipeline {
    index: VectorIndex,
    reranker: Option<Reranker>,
    qa: QaEngine,
    retrieval: RetrievalConfig,
    rerank: ReRankConfig,
}

impl RagPipeline {
    /// Pipeline without a second-stage reranker
    pub fn new(index: VectorIndex, qa: QaEngine, retrieval: RetrievalConfig) -> Self {
        Self {
            index,
            reranker: None,
            qa,
            retrieval,
            rerank: ReRankConfig::default(),
        }
    }

    /// Enable reranking: retrieve `config.candidates`, keep `config.top_k`
    pub fn with_reranker(mut self, reranker: Reranker, config: ReRankConfig) -> Self {
        self.reranker = Some(reranker);
        self.rerank = config;
        self
    }

    /// Ranked evidence for `question`
    pub fn retrieve(&self, question: &str) -> Result<Vec<Candidate>> {
        match &self.reranker {
            Some(reranker) => {
                let candidates = self.index.retrieve(question, self.rerank.candidates)?;
                reranker.rerank(question, candidates, self.rerank.top_k)
            }
            None => self.index.retrieve(question, self.retrieval.top_k),
        }
    }

    /// Answer a single question
    pub async fn answer(&self, question: &str) -> Result<QaRecord> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidArgument("question is empty".to_string()));
        }

        let candidates = self.retrieve(question)?;
        let answer = self.qa.generate_answer(question, &candidates).await?;

        Ok(QaRecord {
            question: question.to_string(),
            answer: answer.answer,
            sources: answer.sources,
        })
    }

    /// Answer questions in order, stopping at the first failure
    pub async fn answer_batch(&self, questions: &[Question]) -> Result<Vec<QaRecord>> {
        self.answer_batch_with_progress(questions, |_| {}).await
    }

    /// Like `answer_batch`, reporting the number of answered questions
    pub async fn answer_batch_with_progress(
        &self,
        questions: &[Question],
        mut on_answer: impl FnMut(usize),
    ) -> Result<Vec<QaRecord>> {
        let mut records = Vec::with_capacity(questions.len());

        for (idx, question) in questions.iter().enumerate() {
            let record = self.answer(&question.question).await?;
            records.push(record);
            on_answer(idx + 1);
        }

        tracing::info!(answered = records.len(), "Batch complete");
        Ok(records)
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn is_reranking(&self) -> bool {
        self.reranker.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_retrieval_config_default() {
        assert_eq!(RetrievalConfig::default().top_k, 5);
    }

    #[test]
    fn test_read_questions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(
            &path,
            r#"[{"question": "What was revenue?"}, {"question": "Who audits the company?"}]"#,
        )
        .unwrap();

        let questions = read_questions(&path).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question, "Who audits the company?");
    }

    #[test]
    fn test_read_questions_rejects_bad_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(&path, r#"{"question": "not an array"}"#).unwrap();

        assert!(matches!(
            read_questions(&path),
            Err(RagError::SerializationError(_))
        ));
    }

    #[test]
    fn test_write_records_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output").join("answers.json");

        let records = vec![QaRecord {
            question: "What was revenue?".to_string(),
            answer: "$10M".to_string(),
            sources: vec![Citation::new("acme-10k", "ITEM 7.", Some(30))],
        }];
        write_records(&path, &records).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["answer"], "$10M");
        assert_eq!(value[0]["sources"][0][2], "p.30");
    }
}
