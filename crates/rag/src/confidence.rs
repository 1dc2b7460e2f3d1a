//! Confidence gate
//!
//! Decides whether a reranked result set is trustworthy enough to answer
//! from. Checks run in configured order, first rejecting check wins, and
//! exactly one reason is reported. This is a heuristic gate: rejecting a
//! good result set costs one extra fallback retrieval, while accepting a
//! contradictory one produces a wrong answer, so the contradiction check
//! runs on every request that has candidates.

use once_cell::sync::Lazy;
use regex::Regex;

use helpdesk_config::constants::gate;
use helpdesk_config::{GateCheckKind, GateSettings};
use helpdesk_core::{ConfidenceVerdict, ScoredDocument, VerdictReason};

/// A number immediately followed by one recognized unit character
static NUMERIC_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d+)([{}])", gate::UNIT_CHARS)).expect("unit pattern is valid")
});

/// Confidence gate with a configurable check order
pub struct ConfidenceGate {
    checks: Vec<GateCheckKind>,
    low_confidence_threshold: f32,
    contradiction_window: usize,
    keyword_coverage_ratio: f32,
    keywords: Vec<String>,
}

impl ConfidenceGate {
    pub fn new(settings: &GateSettings) -> Self {
        Self {
            checks: settings.checks.clone(),
            low_confidence_threshold: settings.low_confidence_threshold,
            contradiction_window: settings.contradiction_window,
            keyword_coverage_ratio: settings.keyword_coverage_ratio,
            keywords: gate::DOMAIN_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the domain keyword set used by the coverage check
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Evaluate the candidate list. Deterministic: identical inputs always
    /// produce the same verdict.
    pub fn evaluate(&self, question: &str, documents: &[ScoredDocument]) -> ConfidenceVerdict {
        for check in &self.checks {
            let rejection = match check {
                GateCheckKind::NoDocuments => self.check_no_documents(documents),
                GateCheckKind::LowConfidence => self.check_low_confidence(documents),
                GateCheckKind::Contradiction => self.check_contradiction(documents),
                GateCheckKind::InsufficientElements => {
                    self.check_insufficient_elements(question, documents)
                }
            };
            if let Some(reason) = rejection {
                tracing::debug!(reason = %reason, "confidence gate rejected result set");
                return ConfidenceVerdict::rejected(reason);
            }
        }
        ConfidenceVerdict::ok()
    }

    fn check_no_documents(&self, documents: &[ScoredDocument]) -> Option<VerdictReason> {
        documents.is_empty().then_some(VerdictReason::NoDocuments)
    }

    fn check_low_confidence(&self, documents: &[ScoredDocument]) -> Option<VerdictReason> {
        let top = documents.first()?;
        (top.final_score < self.low_confidence_threshold).then_some(VerdictReason::LowConfidence)
    }

    /// Two top documents carrying the same unit with different numeric
    /// values contradict each other.
    fn check_contradiction(&self, documents: &[ScoredDocument]) -> Option<VerdictReason> {
        let window = documents
            .iter()
            .take(self.contradiction_window)
            .map(|d| Self::numeric_units(&d.document.content))
            .collect::<Vec<_>>();

        for i in 0..window.len() {
            for j in (i + 1)..window.len() {
                for (num_a, unit_a) in &window[i] {
                    for (num_b, unit_b) in &window[j] {
                        if unit_a == unit_b && num_a != num_b {
                            tracing::debug!(
                                unit = %unit_a,
                                a = %num_a,
                                b = %num_b,
                                "numeric contradiction between top documents"
                            );
                            return Some(VerdictReason::Contradiction);
                        }
                    }
                }
            }
        }
        None
    }

    /// Fewer than the required fraction of the query's domain keywords
    /// appearing in the combined top-document text means the result set
    /// does not cover the question.
    fn check_insufficient_elements(
        &self,
        question: &str,
        documents: &[ScoredDocument],
    ) -> Option<VerdictReason> {
        let in_query: Vec<&String> = self
            .keywords
            .iter()
            .filter(|k| question.contains(k.as_str()))
            .collect();
        if in_query.is_empty() {
            return None;
        }

        let combined: String = documents
            .iter()
            .take(self.contradiction_window)
            .map(|d| d.document.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let covered = in_query
            .iter()
            .filter(|k| combined.contains(k.as_str()))
            .count();

        let required = (in_query.len() as f32 * self.keyword_coverage_ratio).ceil() as usize;
        (covered < required).then_some(VerdictReason::InsufficientElements)
    }

    /// Extract (number, unit) pairs from text
    fn numeric_units(text: &str) -> Vec<(String, String)> {
        NUMERIC_UNIT
            .captures_iter(text)
            .map(|cap| (cap[1].to_string(), cap[2].to_string()))
            .collect()
    }
}
