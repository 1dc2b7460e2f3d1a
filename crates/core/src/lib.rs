//! Core traits and types for the helpdesk answer pipeline
//!
//! This crate provides foundational types used across all other crates:
//! - Corpus document and scored-document types
//! - Query, confidence verdict and chat result types
//! - Service traits for pluggable backends (embedding, document store,
//!   relevance scoring)
//! - Error types

pub mod answer;
pub mod document;
pub mod error;
pub mod query;
pub mod traits;
pub mod verdict;

pub use answer::{ChatResult, ProcessTrace, SearchMode};
pub use document::{Document, DocumentType, ScoredDocument};
pub use error::{Error, Result};
pub use query::Query;
pub use traits::{DocumentStore, Embedder, RelevanceScorer};
pub use verdict::{ConfidenceVerdict, VerdictReason};
