// Page extraction from plain-text exports
use std::fs;
use std::path::Path;

use crate::errors::Result;
use crate::ingest::PageSource;
use crate::types::Page;

/// Page separator emitted by `pdftotext`
pub const FORM_FEED: char = '\x0c';

/// Reads UTF-8 text where pages are separated by form feeds
#[derive(Debug, Clone, Default)]
pub struct TextPageSource;

impl TextPageSource {
    pub fn new() -> Self {
        Self
    }

    /// Split already-loaded text into pages
    ///
    /// Page numbers follow the position in the file, so a dropped blank
    /// page leaves a gap rather than renumbering later pages.
    pub fn split_pages(&self, contents: &str) -> Vec<Page> {
        contents
            .split(FORM_FEED)
            .enumerate()
            .filter_map(|(idx, raw)| {
                let text = raw.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(Page::new(idx as u32 + 1, text))
                }
            })
            .collect()
    }
}

impl PageSource for TextPageSource {
    fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let contents = fs::read_to_string(path)?;
        let pages = self.split_pages(&contents);

        tracing::debug!(path = %path.display(), pages = pages.len(), "Extracted pages");
        Ok(pages)
    }
}
