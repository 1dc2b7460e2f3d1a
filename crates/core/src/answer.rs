//! Final answer and process trace
//!
//! The trace is part of the public contract: callers distinguish "answered"
//! from "degraded" through it, never through the answer text shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verdict::ConfidenceVerdict;

/// Which corpus partition primary retrieval ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// QA corpus with type filter
    Qa,
    /// Widened to the whole corpus after an empty QA result
    All,
}

/// Structured record of every decision made while producing one answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTrace {
    /// Correlation id for logs; fresh per request
    pub request_id: Uuid,
    /// Verbatim user question
    pub original_query: String,
    /// Search-optimized rewrite (equals the original when rewriting failed)
    pub rewritten_query: String,
    /// Corpus partition primary retrieval used
    pub search_mode: SearchMode,
    /// Gate verdict, absent when the request never reached the gate
    pub confidence: Option<ConfidenceVerdict>,
    /// Whether the guideline fallback branch fired
    pub fallback_used: bool,
    /// Citation strings in rank order, `source(type)` form
    pub sources: Vec<String>,
    /// Number of documents handed to synthesis
    pub sources_count: usize,
    /// Whether the last-resort error path produced the answer
    pub error_fallback: bool,
    /// Whether even the last-resort path failed
    pub system_error: bool,
}

impl ProcessTrace {
    /// Fresh trace for a new request
    pub fn new(original_query: impl Into<String>) -> Self {
        let original_query = original_query.into();
        Self {
            request_id: Uuid::new_v4(),
            rewritten_query: original_query.clone(),
            original_query,
            search_mode: SearchMode::Qa,
            confidence: None,
            fallback_used: false,
            sources: Vec::new(),
            sources_count: 0,
            error_fallback: false,
            system_error: false,
        }
    }
}

/// The pipeline's terminal value: a non-empty answer plus its trace.
///
/// Constructed once per request and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub answer: String,
    pub trace: ProcessTrace,
}

impl ChatResult {
    pub fn new(answer: impl Into<String>, trace: ProcessTrace) -> Self {
        Self {
            answer: answer.into(),
            trace,
        }
    }
}
