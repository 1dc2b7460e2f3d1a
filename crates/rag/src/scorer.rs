//! HTTP relevance-scoring client
//!
//! Client for a rerank service exposing the text-embeddings-inference
//! `/rerank` shape: the request carries the query and document texts, the
//! response is a list of `{index, score}` pairs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use helpdesk_config::RerankerSettings;
use helpdesk_core::{Error, RelevanceScorer, Result};

/// Remote cross-encoder client
pub struct HttpRelevanceScorer {
    client: Client,
    endpoint: String,
}

impl HttpRelevanceScorer {
    pub fn new(settings: &RerankerSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| Error::Rag(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn rerank_url(&self) -> String {
        format!("{}/rerank", self.endpoint)
    }
}

#[async_trait]
impl RelevanceScorer for HttpRelevanceScorer {
    async fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>> {
        let request = RerankRequest {
            query: query.to_string(),
            texts: documents.iter().map(|d| d.to_string()).collect(),
        };

        let response = self
            .client
            .post(self.rerank_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Rag(format!("Rerank request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rag(format!("Rerank request failed: {} - {}", status, body)));
        }

        let ranked: Vec<RerankEntry> = response
            .json()
            .await
            .map_err(|e| Error::Rag(format!("Failed to parse rerank response: {}", e)))?;

        // Responses come back sorted by score; restore input order
        let mut scores = vec![0.0f32; documents.len()];
        for entry in ranked {
            if entry.index >= scores.len() {
                return Err(Error::Rag(format!(
                    "Rerank response index {} out of range",
                    entry.index
                )));
            }
            scores[entry.index] = entry.score;
        }

        Ok(scores)
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest {
    query: String,
    texts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RerankEntry {
    index: usize,
    score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let settings = RerankerSettings {
            endpoint: "http://127.0.0.1:8080/".to_string(),
            ..RerankerSettings::default()
        };
        let scorer = HttpRelevanceScorer::new(&settings).unwrap();
        assert_eq!(scorer.rerank_url(), "http://127.0.0.1:8080/rerank");
    }
}
