//! Vector index over chunk embeddings
//!
//! Holds three ordinal-aligned sequences: vectors, texts, metadatas.
//! Ordinal `i` in each refers to the same chunk, through build, save and
//! load. The index is built once from a complete chunk set and never
//! updated afterwards.

pub mod flat;
pub mod store;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::types::{Candidate, Chunk, ChunkMetadata};

pub use flat::FlatIndex;
pub use store::{IndexManifest, SCHEMA_VERSION};

/// Instruction prepended to queries for asymmetric retrieval models
pub const DEFAULT_QUERY_PREFIX: &str =
    "Represent this question for retrieving supporting documents: ";

/// Build and query options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Texts per embedding call during build
    pub batch_size: usize,
    /// Prepended to every query before embedding
    pub query_prefix: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
        }
    }
}

pub struct VectorIndex {
    vectors: FlatIndex,
    texts: Vec<String>,
    metadatas: Vec<ChunkMetadata>,
    embedder: Arc<dyn Embedder>,
    options: IndexOptions,
}

impl VectorIndex {
    /// Embed every chunk and index it in order
    pub fn build(chunks: &[Chunk], embedder: Arc<dyn Embedder>, options: IndexOptions) -> Result<Self> {
        Self::build_with_progress(chunks, embedder, options, |_| {})
    }

    /// Like `build`, reporting the number of chunks embedded after each batch
    pub fn build_with_progress(
        chunks: &[Chunk],
        embedder: Arc<dyn Embedder>,
        options: IndexOptions,
        mut on_batch: impl FnMut(usize),
    ) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(RagError::InvalidArgument(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let metadatas: Vec<ChunkMetadata> = chunks.iter().map(|c| c.metadata.clone()).collect();
        let mut vectors = FlatIndex::new(embedder.dimension());

        if chunks.is_empty() {
            tracing::warn!("Building an empty index; every query will fall back");
        }

        for batch in texts.chunks(options.batch_size) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let embeddings = embedder.encode(&refs, true)?;

            if embeddings.len() != refs.len() {
                return Err(RagError::EmbeddingError(format!(
                    "requested {} embeddings, received {}",
                    refs.len(),
                    embeddings.len()
                )));
            }

            for embedding in &embeddings {
                vectors.add(embedding)?;
            }

            on_batch(refs.len());
        }

        tracing::info!(
            chunks = vectors.len(),
            dimension = vectors.dimension(),
            model = embedder.model_name(),
            "Built vector index"
        );

        Ok(Self {
            vectors,
            texts,
            metadatas,
            embedder,
            options,
        })
    }

    /// Persist vectors and the aligned texts/metadatas
    pub fn save(&self, index_path: &Path, meta_path: &Path) -> Result<()> {
        store::save(
            index_path,
            meta_path,
            &self.vectors,
            &self.texts,
            &self.metadatas,
            self.embedder.model_name(),
        )
    }

    /// Restore a saved index; queries are embedded with `embedder`
    pub fn load(
        index_path: &Path,
        meta_path: &Path,
        embedder: Arc<dyn Embedder>,
        options: IndexOptions,
    ) -> Result<Self> {
        let (vectors, manifest) = store::load(index_path, meta_path)?;

        if vectors.dimension() != embedder.dimension() {
            return Err(RagError::DimensionMismatch {
                expected: vectors.dimension(),
                actual: embedder.dimension(),
            });
        }

        if manifest.embedding_model != embedder.model_name() {
            tracing::warn!(
                index_model = %manifest.embedding_model,
                embedder_model = embedder.model_name(),
                "Embedder differs from the model that built the index"
            );
        }

        tracing::info!(chunks = vectors.len(), created_at = %manifest.created_at, "Loaded vector index");

        Ok(Self {
            vectors,
            texts: manifest.texts,
            metadatas: manifest.metadatas,
            embedder,
            options,
        })
    }

    /// Top-`k` chunks for `query`, most similar first
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Candidate>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be positive".to_string()));
        }

        if self.is_empty() {
            return Ok(Vec::new());
        }

        let prefixed = format!("{}{}", self.options.query_prefix, query);
        let embedding = self.embedder.encode_one(&prefixed, true)?;
        let hits = self.vectors.search(&embedding, k)?;

        tracing::debug!(k, hits = hits.len(), "Retrieved candidates");

        hits.into_iter()
            .map(|(ordinal, score)| {
                self.chunk(ordinal)
                    .map(|chunk| Candidate::new(chunk, score))
                    .ok_or_else(|| {
                        RagError::IndexCorrupt(format!("ordinal {} has no chunk", ordinal))
                    })
            })
            .collect()
    }

    /// Reassemble the chunk at `ordinal`
    pub fn chunk(&self, ordinal: usize) -> Option<Chunk> {
        Some(Chunk {
            text: self.texts.get(ordinal)?.clone(),
            metadata: self.metadatas.get(ordinal)?.clone(),
        })
    }

    /// All indexed chunks in ordinal order
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        self.texts
            .iter()
            .zip(&self.metadatas)
            .map(|(text, metadata)| Chunk {
                text: text.clone(),
                metadata: metadata.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn metadatas(&self) -> &[ChunkMetadata] {
        &self.metadatas
    }
}
