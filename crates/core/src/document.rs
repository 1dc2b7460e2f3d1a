//! Corpus document types
//!
//! `Document` is the immutable record owned by the external store.
//! `ScoredDocument` is the per-request score bag built up by retrieval and
//! reranking; every score field defaults to zero so each pipeline stage only
//! writes the fields it owns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Metadata keys the pipeline reads from indexed documents
pub mod meta {
    pub const SOURCE: &str = "source";
    pub const TITLE: &str = "title";
    pub const CATEGORY: &str = "category";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Number of content characters used as a merge key when a document
/// carries no id
const MERGE_KEY_PREFIX_CHARS: usize = 50;

/// Corpus partition a document belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Curated question/answer pairs (primary corpus)
    Qa,
    /// Policy and guideline documents (fallback corpus)
    Guideline,
    /// Anything else carried in the store
    #[serde(untagged)]
    Other(String),
}

impl DocumentType {
    /// Stable string form used for store-side type filters
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Qa => "qa",
            DocumentType::Guideline => "guideline",
            DocumentType::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DocumentType {
    fn from(s: &str) -> Self {
        match s {
            "qa" => DocumentType::Qa,
            "guideline" => DocumentType::Guideline,
            other => DocumentType::Other(other.to_string()),
        }
    }
}

/// Immutable corpus record, read-only from the pipeline's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique ID assigned at ingestion time
    pub id: String,
    /// Document text
    pub content: String,
    /// Corpus partition
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Ingestion metadata (`source`, `title`, `category`, `updated_at`)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with empty metadata
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        doc_type: DocumentType,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            doc_type,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Citation source, if the ingestion pipeline recorded one
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .get(meta::SOURCE)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Key used to merge vector and lexical result sets.
    ///
    /// Falls back to a content prefix when the id is empty, so documents
    /// ingested without ids still merge deterministically.
    pub fn merge_key(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        self.content.chars().take(MERGE_KEY_PREFIX_CHARS).collect()
    }
}

/// A document plus the per-request score bag.
///
/// `final_score` is the last score written by the pipeline and the only
/// field consulted after reranking.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity score from the vector store (normalized during fusion)
    pub vector_score: f32,
    /// BM25 score from the lexical pass (normalized during fusion)
    pub lexical_score: f32,
    /// Cross-encoder relevance score, when the scorer is available
    pub rerank_score: f32,
    /// Fused ranking score
    pub final_score: f32,
}

impl ScoredDocument {
    /// Wrap a document with all scores zeroed
    pub fn new(document: Document) -> Self {
        Self {
            document,
            vector_score: 0.0,
            lexical_score: 0.0,
            rerank_score: 0.0,
            final_score: 0.0,
        }
    }

    /// Merge key of the underlying document
    pub fn merge_key(&self) -> String {
        self.document.merge_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_roundtrip() {
        assert_eq!(DocumentType::from("qa"), DocumentType::Qa);
        assert_eq!(DocumentType::from("guideline"), DocumentType::Guideline);
        assert_eq!(
            DocumentType::from("faq"),
            DocumentType::Other("faq".to_string())
        );
        assert_eq!(DocumentType::Qa.as_str(), "qa");
    }

    #[test]
    fn test_merge_key_prefers_id() {
        let doc = Document::new("doc-1", "チェックインは15時からです", DocumentType::Qa);
        assert_eq!(doc.merge_key(), "doc-1");
    }

    #[test]
    fn test_merge_key_content_fallback() {
        let long = "あ".repeat(80);
        let doc = Document::new("", long.clone(), DocumentType::Qa);
        let key = doc.merge_key();
        assert_eq!(key.chars().count(), 50);
        assert!(long.starts_with(&key));
    }

    #[test]
    fn test_scored_document_defaults_to_zero() {
        let scored = ScoredDocument::new(Document::new("1", "text", DocumentType::Qa));
        assert_eq!(scored.vector_score, 0.0);
        assert_eq!(scored.lexical_score, 0.0);
        assert_eq!(scored.rerank_score, 0.0);
        assert_eq!(scored.final_score, 0.0);
    }

    #[test]
    fn test_source_filters_empty() {
        let doc = Document::new("1", "text", DocumentType::Qa).with_meta(meta::SOURCE, "");
        assert_eq!(doc.source(), None);
        let doc = doc.with_meta(meta::SOURCE, "利用マニュアル");
        assert_eq!(doc.source(), Some("利用マニュアル"));
    }
}
