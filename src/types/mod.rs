//! Type definitions module
//! 
//! Core data model shared by segmentation, indexing, reranking and
//! context assembly.

pub mod chunk;
pub mod citation;

// Re-export commonly used types
pub use chunk::{Candidate, Chunk, ChunkMetadata, ItemTag, Page};
pub use citation::Citation;
