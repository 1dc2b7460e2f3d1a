//! Cross-encoder reranking with graceful degradation
//!
//! The relevance model is an injected optional capability. When present,
//! every (query, content) pair is scored and the blended score replaces
//! the retrieval ranking; when absent or failing, the retrieval scores
//! stand unchanged. Reranking is never a hard dependency for answering,
//! so this component does not return errors.

use std::sync::Arc;

use helpdesk_config::RerankerSettings;
use helpdesk_core::{RelevanceScorer, ScoredDocument};

/// Reranker over an optional relevance scorer
pub struct Reranker {
    scorer: Option<Arc<dyn RelevanceScorer>>,
    prior_weight: f32,
    rerank_weight: f32,
}

impl Reranker {
    /// Reranker with a relevance scorer
    pub fn new(scorer: Arc<dyn RelevanceScorer>, settings: &RerankerSettings) -> Self {
        Self {
            scorer: Some(scorer),
            prior_weight: settings.prior_weight,
            rerank_weight: settings.rerank_weight,
        }
    }

    /// Reranker without a scorer: ranking falls through to prior scores
    pub fn disabled() -> Self {
        Self {
            scorer: None,
            prior_weight: 0.0,
            rerank_weight: 0.0,
        }
    }

    /// Whether a relevance scorer is configured
    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Re-score candidates against the query and keep the top `top_n`.
    ///
    /// Output length is `min(top_n, input length)`; order is descending
    /// `final_score` with stable ties.
    pub async fn rerank(
        &self,
        query: &str,
        mut documents: Vec<ScoredDocument>,
        top_n: usize,
    ) -> Vec<ScoredDocument> {
        if documents.is_empty() {
            return documents;
        }

        if let Some(ref scorer) = self.scorer {
            let contents: Vec<&str> = documents
                .iter()
                .map(|d| d.document.content.as_str())
                .collect();

            match scorer.score(query, &contents).await {
                Ok(scores) if scores.len() == documents.len() => {
                    for (doc, score) in documents.iter_mut().zip(scores) {
                        doc.rerank_score = score;
                        doc.final_score =
                            self.prior_weight * doc.final_score + self.rerank_weight * score;
                    }
                }
                Ok(scores) => {
                    tracing::warn!(
                        expected = documents.len(),
                        got = scores.len(),
                        "relevance scorer returned wrong arity, keeping retrieval scores"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reranking failed, keeping retrieval scores");
                }
            }
        }

        documents.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        documents.truncate(top_n);
        documents
    }
}
