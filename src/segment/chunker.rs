//! Token-budgeted, item-homogeneous chunking
//!
//! Pages are folded in order into a buffer. The buffer is flushed when the
//! item tag changes or when the next page would push it over the budget.
//! Pages are never split: a page larger than the budget becomes a chunk
//! on its own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{RagError, Result};
use crate::segment::tagger::{ItemTagger, DEFAULT_SCAN_LINES};
use crate::tokens::TokenCounter;
use crate::types::{Chunk, ChunkMetadata, ItemTag, Page};

/// Segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Token budget per chunk
    pub chunk_size: usize,
    /// Declared for compatibility with existing configs; not applied.
    /// Chunks never overlap.
    pub chunk_overlap: usize,
    /// Leading lines of each page scanned for an item heading
    pub heading_scan_lines: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            heading_scan_lines: DEFAULT_SCAN_LINES,
        }
    }
}

/// Pages accumulated for the chunk under construction
struct ChunkBuffer {
    text: String,
    tokens: usize,
    item: ItemTag,
    page_start: u32,
    page_end: u32,
}

impl ChunkBuffer {
    fn start(page: &Page, item: ItemTag, tokens: usize) -> Self {
        Self {
            text: page.text.trim().to_string(),
            tokens,
            item,
            page_start: page.page_number,
            page_end: page.page_number,
        }
    }

    fn append(&mut self, page: &Page, tokens: usize) {
        self.text.push('\n');
        self.text.push_str(page.text.trim());
        self.tokens += tokens;
        self.page_end = page.page_number;
    }

    fn finish(self, document: &str, source: &str) -> Chunk {
        Chunk {
            text: self.text,
            metadata: ChunkMetadata {
                document: document.to_string(),
                item: self.item,
                page_start: self.page_start,
                page_end: self.page_end,
                source: source.to_string(),
                page: None,
            },
        }
    }
}

/// Converts an ordered page list into tagged chunks
pub struct Segmenter {
    config: SegmentConfig,
    tagger: ItemTagger,
    counter: Arc<dyn TokenCounter>,
}

impl Segmenter {
    pub fn new(config: SegmentConfig, counter: Arc<dyn TokenCounter>) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(RagError::ConfigError(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if config.chunk_overlap > 0 {
            tracing::debug!(
                chunk_overlap = config.chunk_overlap,
                "chunk_overlap is declared but not applied; chunks do not overlap"
            );
        }

        let tagger = ItemTagger::new(config.heading_scan_lines)?;

        Ok(Self {
            config,
            tagger,
            counter,
        })
    }

    /// Segment one document's pages
    ///
    /// Blank pages are dropped before tagging. Every remaining page lands
    /// in exactly one chunk.
    pub fn segment(&self, pages: &[Page], document: &str, source: &str) -> Result<Vec<Chunk>> {
        let pages: Vec<Page> = pages.iter().filter(|p| !p.is_blank()).cloned().collect();
        let tags = self.tagger.tag_pages(&pages);

        let mut chunks = Vec::new();
        let mut buffer: Option<ChunkBuffer> = None;

        for (page, item) in pages.iter().zip(tags) {
            let tokens = self.counter.count(page.text.trim())?;

            buffer = Some(match buffer.take() {
                None => ChunkBuffer::start(page, item, tokens),
                Some(current) if current.item != item => {
                    chunks.push(current.finish(document, source));
                    ChunkBuffer::start(page, item, tokens)
                }
                Some(mut current) if current.tokens + tokens <= self.config.chunk_size => {
                    current.append(page, tokens);
                    current
                }
                Some(current) => {
                    chunks.push(current.finish(document, source));
                    ChunkBuffer::start(page, item, tokens)
                }
            });
        }

        if let Some(current) = buffer {
            chunks.push(current.finish(document, source));
        }

        tracing::debug!(
            document,
            pages = pages.len(),
            chunks = chunks.len(),
            "Segmented document"
        );

        Ok(chunks)
    }

    pub fn tagger(&self) -> &ItemTagger {
        &self.tagger
    }
}
