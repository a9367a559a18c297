//! Pages, item tags, chunks and retrieval candidates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for pages that precede any recognized heading
pub const UNKNOWN_ITEM: &str = "Unknown";

/// One extracted page of a source document (1-indexed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

impl Page {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Blank pages never reach a chunk
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Document-section label attached to a page and propagated to chunks
///
/// Serialized as a plain string: `"Unknown"` or the uppercase heading
/// (e.g. `"ITEM 1A."`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemTag {
    #[default]
    Unknown,
    Known(String),
}

impl ItemTag {
    /// Tag from a matched heading, normalized to uppercase
    pub fn known(label: &str) -> Self {
        ItemTag::Known(label.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemTag::Unknown => UNKNOWN_ITEM,
            ItemTag::Known(label) => label,
        }
    }
}

impl fmt::Display for ItemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ItemTag {
    fn from(value: String) -> Self {
        if value == UNKNOWN_ITEM || value.trim().is_empty() {
            ItemTag::Unknown
        } else {
            ItemTag::Known(value)
        }
    }
}

impl From<ItemTag> for String {
    fn from(tag: ItemTag) -> Self {
        match tag {
            ItemTag::Unknown => UNKNOWN_ITEM.to_string(),
            ItemTag::Known(label) => label,
        }
    }
}

/// Provenance recorded for every chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Document identifier (file stem of the source)
    pub document: String,
    /// Item tag active for every page in the chunk
    pub item: ItemTag,
    /// Page number of the first page in the chunk
    pub page_start: u32,
    /// Page number of the last page in the chunk
    pub page_end: u32,
    /// Source identifier, usually the document path
    pub source: String,
    /// Exact page of the cited passage, when known more precisely than the chunk start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Token-bounded, item-homogeneous span of document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk scored during a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub chunk: Chunk,
    /// Inner-product similarity from the vector index
    pub score: f32,
    /// Second-stage score, set by the reranker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
}

impl Candidate {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self {
            chunk,
            score,
            rerank_score: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.chunk.text
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.chunk.metadata
    }

    /// Most recent relevance score: rerank score if present, else similarity
    pub fn relevance(&self) -> f32 {
        self.rerank_score.unwrap_or(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_tag_serializes_as_string() {
        let json = serde_json::to_string(&ItemTag::known("item 1a.")).unwrap();
        assert_eq!(json, "\"ITEM 1A.\"");

        let json = serde_json::to_string(&ItemTag::Unknown).unwrap();
        assert_eq!(json, "\"Unknown\"");
    }

    #[test]
    fn test_item_tag_deserializes_unknown() {
        let tag: ItemTag = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(tag, ItemTag::Unknown);

        let tag: ItemTag = serde_json::from_str("\"ITEM 7.\"").unwrap();
        assert_eq!(tag, ItemTag::Known("ITEM 7.".to_string()));
    }

    #[test]
    fn test_blank_page() {
        assert!(Page::new(1, "  \n\t ").is_blank());
        assert!(!Page::new(1, " text ").is_blank());
    }

    #[test]
    fn test_metadata_omits_missing_page() {
        let metadata = ChunkMetadata {
            document: "acme-10k".to_string(),
            item: ItemTag::Unknown,
            page_start: 3,
            page_end: 4,
            source: "data/acme-10k.txt".to_string(),
            page: None,
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value.get("page").is_none());
        assert_eq!(value["page_start"], 3);
    }

    #[test]
    fn test_candidate_relevance_prefers_rerank_score() {
        let chunk = Chunk {
            text: "text".to_string(),
            metadata: ChunkMetadata {
                document: "d".to_string(),
                item: ItemTag::Unknown,
                page_start: 1,
                page_end: 1,
                source: "s".to_string(),
                page: None,
            },
        };
        let mut candidate = Candidate::new(chunk, 0.4);
        assert_eq!(candidate.relevance(), 0.4);
        candidate.rerank_score = Some(7.5);
        assert_eq!(candidate.relevance(), 7.5);
    }
}
