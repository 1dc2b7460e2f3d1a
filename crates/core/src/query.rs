//! Query type carried through the pipeline

use serde::{Deserialize, Serialize};

/// A user question plus its search-optimized rewrite.
///
/// `rewritten` is always populated; when rewriting fails or is disabled it
/// holds the original text unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Verbatim user text
    pub original: String,
    /// Search-optimized form used for retrieval
    pub rewritten: String,
}

impl Query {
    /// Query whose rewrite equals the original text
    pub fn verbatim(text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            rewritten: original.clone(),
            original,
        }
    }

    /// Query with a distinct rewrite
    pub fn rewritten(original: impl Into<String>, rewritten: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            rewritten: rewritten.into(),
        }
    }

    /// Text retrieval should run against
    pub fn effective(&self) -> &str {
        &self.rewritten
    }
}
