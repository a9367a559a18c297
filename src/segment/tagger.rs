//! Item-heading detection
//!
//! A page takes the first `ITEM <n>[letter][.]` heading found in its
//! leading lines; otherwise it inherits the tag of the most recently tagged
//! page. Tags never propagate backward.

use regex::Regex;

use crate::errors::{RagError, Result};
use crate::types::{ItemTag, Page};

/// Heading anchored at line start, optional leading whitespace, any case
const ITEM_PATTERN: &str = r"(?i)^\s*(ITEM\s+\d+[A-Z]?\.?)\s*(.*)$";

/// Default number of leading lines scanned per page
pub const DEFAULT_SCAN_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct ItemTagger {
    pattern: Regex,
    scan_lines: usize,
}

impl ItemTagger {
    pub fn new(scan_lines: usize) -> Result<Self> {
        let pattern = Regex::new(ITEM_PATTERN)
            .map_err(|e| RagError::ConfigError(format!("Invalid item pattern: {}", e)))?;

        Ok(Self {
            pattern,
            scan_lines,
        })
    }

    /// First heading within the scanned lines of `text`, if any
    pub fn heading(&self, text: &str) -> Option<ItemTag> {
        text.trim_start()
            .lines()
            .take(self.scan_lines)
            .find_map(|line| self.pattern.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| ItemTag::known(m.as_str()))
    }

    /// Tag every page, carrying the last seen heading forward
    pub fn tag_pages(&self, pages: &[Page]) -> Vec<ItemTag> {
        let mut current = ItemTag::Unknown;

        pages
            .iter()
            .map(|page| {
                if let Some(tag) = self.heading(&page.text) {
                    current = tag;
                }
                current.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> ItemTagger {
        ItemTagger::new(DEFAULT_SCAN_LINES).unwrap()
    }

    #[test]
    fn test_matches_heading_with_letter() {
        let tag = tagger().heading("Table of contents\nItem 1A. Risk Factors\nmore");
        assert_eq!(tag, Some(ItemTag::Known("ITEM 1A.".to_string())));
    }

    #[test]
    fn test_matches_leading_whitespace_and_no_period() {
        let tag = tagger().heading("   item 7 Management's Discussion");
        assert_eq!(tag, Some(ItemTag::Known("ITEM 7".to_string())));
    }

    #[test]
    fn test_ignores_heading_not_at_line_start() {
        let tag = tagger().heading("See Item 1A. for details");
        assert_eq!(tag, None);
    }

    #[test]
    fn test_ignores_malformed_heading() {
        assert_eq!(tagger().heading("ITEMS 3. Legal"), None);
        assert_eq!(tagger().heading("ITEM A. Legal"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let tag = tagger().heading("ITEM 2. Properties\nITEM 3. Legal Proceedings");
        assert_eq!(tag, Some(ItemTag::Known("ITEM 2.".to_string())));
    }

    #[test]
    fn test_scan_limit() {
        let mut text = "filler\n".repeat(20);
        text.push_str("ITEM 5. Market");
        assert_eq!(tagger().heading(&text), None);

        let wide = ItemTagger::new(21).unwrap();
        assert!(wide.heading(&text).is_some());
    }

    #[test]
    fn test_leading_blank_lines_do_not_use_scan_window() {
        let text = format!("{}ITEM 2. Properties\nOffices in Ohio.", "\n".repeat(30));
        assert_eq!(tagger().heading(&text), Some(ItemTag::known("ITEM 2.")));

        let page = Page::new(9, text);
        assert_eq!(tagger().tag_pages(&[page]), vec![ItemTag::known("ITEM 2.")]);
    }

    #[test]
    fn test_tags_carry_forward() {
        let pages = vec![
            Page::new(1, "Cover page"),
            Page::new(2, "ITEM 1. Business"),
            Page::new(3, "continued discussion"),
            Page::new(4, "ITEM 1A. Risk Factors"),
            Page::new(5, "more risks"),
        ];

        let tags = tagger().tag_pages(&pages);
        assert_eq!(tags[0], ItemTag::Unknown);
        assert_eq!(tags[1], ItemTag::known("ITEM 1."));
        assert_eq!(tags[2], ItemTag::known("ITEM 1."));
        assert_eq!(tags[3], ItemTag::known("ITEM 1A."));
        assert_eq!(tags[4], ItemTag::known("ITEM 1A."));
    }

    #[test]
    fn test_no_headings_all_unknown() {
        let pages = vec![Page::new(1, "alpha"), Page::new(2, "beta")];
        let tags = tagger().tag_pages(&pages);
        assert!(tags.iter().all(|t| *t == ItemTag::Unknown));
    }
}
