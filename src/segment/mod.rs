//! Document segmentation
//!
//! Tags pages with the item heading they belong to and folds them into
//! token-bounded chunks.

pub mod chunker;
pub mod tagger;

use std::path::Path;

use crate::errors::Result;
use crate::ingest::{discover_documents, PageSource};
use crate::types::Chunk;

pub use chunker::{SegmentConfig, Segmenter};
pub use tagger::ItemTagger;

/// Extract and segment every matching document in `dir`
pub fn prepare_chunks(
    dir: &Path,
    extension: &str,
    source: &dyn PageSource,
    segmenter: &Segmenter,
) -> Result<Vec<Chunk>> {
    let mut all_chunks = Vec::new();

    for document in discover_documents(dir, extension)? {
        let pages = source.extract(&document.path)?;
        let chunks = segmenter.segment(&pages, &document.id, &document.source())?;
        all_chunks.extend(chunks);
    }

    tracing::info!(chunks = all_chunks.len(), dir = %dir.display(), "Prepared chunks");
    Ok(all_chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::TextPageSource;
    use crate::tokens::HeuristicCounter;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_chunks_over_corpus() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("alpha.txt"),
            "ITEM 1. Business\x0cITEM 1A. Risk Factors",
        )
        .unwrap();
        fs::write(temp.path().join("beta.txt"), "Cover\x0c\x0cITEM 7. MD&A").unwrap();

        let segmenter =
            Segmenter::new(SegmentConfig::default(), Arc::new(HeuristicCounter::new())).unwrap();
        let chunks =
            prepare_chunks(temp.path(), "txt", &TextPageSource::new(), &segmenter).unwrap();

        let docs: Vec<&str> = chunks.iter().map(|c| c.metadata.document.as_str()).collect();
        assert_eq!(docs, vec!["alpha", "alpha", "beta", "beta"]);
        assert_eq!(chunks[3].metadata.page_start, 3);
        assert!(chunks[3].metadata.source.ends_with("beta.txt"));
    }
}
