//! Structured source citation
//!
//! The same type is used in prompt text and in programmatic output.
//! On the wire it is a three-element array: `[document, item, "p.<page>"]`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::chunk::ChunkMetadata;

/// Placeholder rendered when no page is known
const PAGE_UNKNOWN: &str = "NA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "(String, String, String)",
    try_from = "(String, String, String)"
)]
pub struct Citation {
    pub document: String,
    pub item: String,
    pub page: Option<u32>,
}

impl Citation {
    pub fn new(document: impl Into<String>, item: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            document: document.into(),
            item: item.into(),
            page,
        }
    }

    /// Resolve page from the per-candidate page, else the chunk's first page
    pub fn from_metadata(metadata: &ChunkMetadata) -> Self {
        Self {
            document: metadata.document.clone(),
            item: metadata.item.to_string(),
            page: metadata.page.or(Some(metadata.page_start)),
        }
    }

    /// Page label in `p.<page>` form
    pub fn page_label(&self) -> String {
        match self.page {
            Some(page) => format!("p.{}", page),
            None => format!("p.{}", PAGE_UNKNOWN),
        }
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.document, self.item, self.page_label())
    }
}

impl From<Citation> for (String, String, String) {
    fn from(citation: Citation) -> Self {
        let page = citation.page_label();
        (citation.document, citation.item, page)
    }
}

impl TryFrom<(String, String, String)> for Citation {
    type Error = String;

    fn try_from((document, item, page): (String, String, String)) -> Result<Self, Self::Error> {
        let raw = page
            .strip_prefix("p.")
            .ok_or_else(|| format!("page label must start with 'p.': {}", page))?;

        let page = if raw == PAGE_UNKNOWN {
            None
        } else {
            Some(
                raw.parse::<u32>()
                    .map_err(|e| format!("invalid page number '{}': {}", raw, e))?,
            )
        };

        Ok(Self {
            document,
            item,
            page,
        })
    }
}
