//! filingqa - Retrieval and question answering over long structured filings
//!
//! Turns page-structured documents into item-tagged, token-bounded chunks,
//! indexes them by embedding, and answers questions from a token-budgeted
//! evidence context with page-level citations.
//!
//! # Architecture
//!
//! - **Segmentation**: item tagging + token-budgeted chunking
//! - **Index**: flat inner-product vector index with persistence
//! - **RAG**: reranking, context assembly, grounded answering

pub mod errors;
pub mod types;
pub mod tokens;

// Re-export commonly used types
pub use errors::{RagError, Result};

// Corpus preparation
pub mod ingest;
pub mod segment;

// Embedding and retrieval
pub mod embedding;
pub mod index;

// Answering
pub mod generation;
pub mod rag;

pub mod cli;
