//! Service traits for pluggable backends
//!
//! All external collaborators sit behind these traits so deployments can
//! swap implementations and tests can inject mocks. Handles are read-only
//! and safe to share across in-flight requests.

use async_trait::async_trait;

use crate::document::{Document, DocumentType};
use crate::error::Result;

/// Maps text to a fixed-length vector.
///
/// Deterministic for identical input; used for both indexing-time and
/// query-time matching.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vector dimensionality
    fn dim(&self) -> usize;
}

/// Vector similarity search plus raw record listing over the corpus.
///
/// Similarity scores are comparable only within one call's result set.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Top-k documents by vector similarity, optionally filtered by type
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        type_filter: Option<&DocumentType>,
    ) -> Result<Vec<(Document, f32)>>;

    /// Full document listing, optionally filtered by type.
    ///
    /// Bounded by corpus size; used for per-request lexical scoring.
    async fn list_all(&self, type_filter: Option<&DocumentType>) -> Result<Vec<Document>>;
}

/// Optional cross-document relevance model.
///
/// Absence is modeled by not injecting an implementation at all; the
/// reranker degrades to prior scores in that case.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Pairwise relevance of each document text against the query,
    /// higher is better, one score per input document
    async fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>>;
}
