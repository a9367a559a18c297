//! Document ingestion
//!
//! Page extraction is an external concern behind `PageSource`; this module
//! also discovers the documents of a corpus directory.

pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::types::Page;

pub use text::TextPageSource;

/// Text-extraction interface
pub trait PageSource: Send + Sync {
    /// Ordered pages of one document, numbered from 1. Pages without
    /// obtainable text are omitted.
    fn extract(&self, path: &Path) -> Result<Vec<Page>>;
}

/// A document found in the corpus directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Document identifier (file stem)
    pub id: String,
    pub path: PathBuf,
}

impl DocumentRef {
    pub fn from_path(path: PathBuf) -> Self {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self { id, path }
    }

    /// Source identifier recorded in chunk metadata
    pub fn source(&self) -> String {
        self.path.display().to_string()
    }
}

/// List files in `dir` with the given extension, sorted by path
pub fn discover_documents(dir: &Path, extension: &str) -> Result<Vec<DocumentRef>> {
    let mut documents = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);

        if matches {
            documents.push(DocumentRef::from_path(path));
        }
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = documents.len(), dir = %dir.display(), "Discovered documents");

    Ok(documents)
}
