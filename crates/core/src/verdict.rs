//! Confidence gate verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the gate accepted or rejected a result set.
///
/// Exactly one reason is reported per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// Results are trustworthy enough to answer from
    Ok,
    /// Candidate list was empty
    NoDocuments,
    /// Top document scored below the confidence threshold
    LowConfidence,
    /// Two top documents disagree on a numeric fact
    Contradiction,
    /// Query keywords are poorly covered by the top documents
    InsufficientElements,
}

impl fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictReason::Ok => "ok",
            VerdictReason::NoDocuments => "no_documents",
            VerdictReason::LowConfidence => "low_confidence",
            VerdictReason::Contradiction => "contradiction",
            VerdictReason::InsufficientElements => "insufficient_elements",
        };
        f.write_str(s)
    }
}

/// Outcome of one confidence-gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    pub is_confident: bool,
    pub reason: VerdictReason,
}

impl ConfidenceVerdict {
    /// Accepting verdict
    pub fn ok() -> Self {
        Self {
            is_confident: true,
            reason: VerdictReason::Ok,
        }
    }

    /// Rejecting verdict with the given reason
    pub fn rejected(reason: VerdictReason) -> Self {
        debug_assert!(reason != VerdictReason::Ok);
        Self {
            is_confident: false,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_constructors() {
        assert!(ConfidenceVerdict::ok().is_confident);
        assert_eq!(ConfidenceVerdict::ok().reason, VerdictReason::Ok);

        let rejected = ConfidenceVerdict::rejected(VerdictReason::Contradiction);
        assert!(!rejected.is_confident);
        assert_eq!(rejected.reason, VerdictReason::Contradiction);
    }

    #[test]
    fn test_reason_serialized_form() {
        let json = serde_json::to_string(&VerdictReason::InsufficientElements).unwrap();
        assert_eq!(json, "\"insufficient_elements\"");
        assert_eq!(VerdictReason::NoDocuments.to_string(), "no_documents");
    }
}
