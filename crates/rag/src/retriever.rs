//! Hybrid retriever
//!
//! Fuses vector similarity and lexical BM25 into one ranked candidate
//! list. The vector search and the full-corpus fetch for lexical scoring
//! are independent and run concurrently; results merge by document id
//! (content prefix when the id is missing), each score family is
//! normalized by its batch maximum with the denominator floored at 1, and
//! the weighted sum ranks the batch. Ties keep corpus order.

use std::collections::HashMap;
use std::sync::Arc;

use helpdesk_config::{RetrievalSettings, SearchStrategy};
use helpdesk_core::{DocumentStore, DocumentType, Embedder, ScoredDocument};

use crate::lexical::LexicalScorer;
use crate::tokenizer::Tokenizer;
use crate::RagError;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Hybrid fusion or vector-only
    pub strategy: SearchStrategy,
    /// Weight of the normalized vector score
    pub vector_weight: f32,
    /// Weight of the normalized lexical score
    pub lexical_weight: f32,
    /// Vector search fetches `k * oversample` candidates
    pub oversample: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for RetrieverConfig {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            strategy: settings.strategy,
            vector_weight: settings.vector_weight,
            lexical_weight: settings.lexical_weight,
            oversample: settings.oversample,
        }
    }
}

/// Hybrid retriever over an embedder and a document store
pub struct HybridRetriever {
    config: RetrieverConfig,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    tokenizer: Tokenizer,
    lexical: LexicalScorer,
}

impl HybridRetriever {
    pub fn new(
        config: RetrieverConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
            tokenizer: Tokenizer::default(),
            lexical: LexicalScorer::default(),
        }
    }

    /// Use a specific tokenizer (e.g. the degraded character-class mode)
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Top-k candidates for the query, fused and sorted descending.
    ///
    /// In vector-only mode the same fusion path runs with the lexical
    /// weight forced to 0 (and the vector weight to 1), so callers see
    /// identical shapes either way.
    pub async fn retrieve(
        &self,
        query: &str,
        doc_type: Option<&DocumentType>,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RagError> {
        let query_vector = self.embedder.embed(query).await?;
        let fetch_k = k.saturating_mul(self.config.oversample).max(k);

        let (vector_results, corpus) = match self.config.strategy {
            SearchStrategy::Hybrid => {
                // Vector search and corpus fetch are independent
                let (vector, corpus) = tokio::join!(
                    self.store.search(&query_vector, fetch_k, doc_type),
                    self.store.list_all(doc_type),
                );
                (vector?, corpus?)
            }
            SearchStrategy::VectorOnly => {
                (self.store.search(&query_vector, fetch_k, doc_type).await?, Vec::new())
            }
        };

        if vector_results.is_empty() && corpus.is_empty() {
            return Ok(Vec::new());
        }

        // Candidate list: corpus order first, vector-only extras after in
        // rank order. Stable sort later preserves this on score ties.
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<ScoredDocument> = Vec::with_capacity(corpus.len());

        let lexical_scores = if corpus.is_empty() {
            Vec::new()
        } else {
            let tokenized: Vec<Vec<String>> = corpus
                .iter()
                .map(|doc| self.tokenizer.tokenize(&doc.content))
                .collect();
            let query_tokens = self.tokenizer.tokenize(query);
            self.lexical.score_all(&tokenized, &query_tokens)
        };

        for (doc, lexical_score) in corpus.into_iter().zip(
            lexical_scores
                .into_iter()
                .chain(std::iter::repeat(0.0)),
        ) {
            let key = doc.merge_key();
            let mut scored = ScoredDocument::new(doc);
            scored.lexical_score = lexical_score;
            index.insert(key, candidates.len());
            candidates.push(scored);
        }

        for (doc, similarity) in vector_results {
            let key = doc.merge_key();
            match index.get(&key).copied() {
                Some(i) => candidates[i].vector_score = similarity,
                None => {
                    let mut scored = ScoredDocument::new(doc);
                    scored.vector_score = similarity;
                    index.insert(key, candidates.len());
                    candidates.push(scored);
                }
            }
        }

        let (vector_weight, lexical_weight) = match self.config.strategy {
            SearchStrategy::Hybrid => (self.config.vector_weight, self.config.lexical_weight),
            SearchStrategy::VectorOnly => (1.0, 0.0),
        };

        Self::fuse(&mut candidates, vector_weight, lexical_weight);

        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(k);

        tracing::debug!(
            k,
            returned = candidates.len(),
            strategy = ?self.config.strategy,
            "hybrid retrieval complete"
        );

        Ok(candidates)
    }

    /// Bare similarity search used by the last-resort error path: no
    /// type filter, no lexical pass, raw similarity as the final score.
    pub async fn vector_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, RagError> {
        let query_vector = self.embedder.embed(query).await?;
        let results = self.store.search(&query_vector, k, None).await?;

        Ok(results
            .into_iter()
            .map(|(doc, similarity)| {
                let mut scored = ScoredDocument::new(doc);
                scored.vector_score = similarity;
                scored.final_score = similarity;
                scored
            })
            .collect())
    }

    /// Normalize each score family by its batch maximum (denominator
    /// floored at 1) and write the weighted sum into `final_score`.
    fn fuse(candidates: &mut [ScoredDocument], vector_weight: f32, lexical_weight: f32) {
        let max_vector = candidates
            .iter()
            .map(|c| c.vector_score)
            .fold(0.0f32, f32::max)
            .max(1.0);
        let max_lexical = candidates
            .iter()
            .map(|c| c.lexical_score)
            .fold(0.0f32, f32::max)
            .max(1.0);

        for candidate in candidates {
            let normalized_vector = candidate.vector_score / max_vector;
            let normalized_lexical = candidate.lexical_score / max_lexical;
            candidate.final_score =
                vector_weight * normalized_vector + lexical_weight * normalized_lexical;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryStore;
    use async_trait::async_trait;
    use helpdesk_core::{Document, Embedder};

    /// Deterministic embedder: maps known phrases to fixed unit vectors
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> helpdesk_core::Result<Vec<f32>> {
            // Axis 0: billing topics, axis 1: cleaning topics
            let v = if text.contains("料金") || text.contains("利用単位") {
                vec![1.0, 0.0]
            } else if text.contains("清掃") {
                vec![0.0, 1.0]
            } else {
                vec![0.5, 0.5]
            };
            Ok(v)
        }

        fn dim(&self) -> usize {
            2
        }
    }

    fn store_with_docs(docs: Vec<(Document, Vec<f32>)>) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for (doc, emb) in docs {
            store.insert(doc, emb);
        }
        store
    }

    fn qa_doc(id: &str, content: &str) -> Document {
        Document::new(id, content, helpdesk_core::DocumentType::Qa)
    }

    #[tokio::test]
    async fn test_fused_scores_bounded_and_sorted() {
        let store = store_with_docs(vec![
            (qa_doc("1", "利用単位と料金の説明"), vec![1.0, 0.0]),
            (qa_doc("2", "清掃の手順"), vec![0.0, 1.0]),
            (qa_doc("3", "予約の方法"), vec![0.4, 0.4]),
        ]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);

        let results = retriever.retrieve("料金について", None, 3).await.unwrap();
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.final_score >= 0.0 && result.final_score <= 1.0);
        }
        for pair in results.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
        assert_eq!(results[0].document.id, "1");
    }

    #[tokio::test]
    async fn test_empty_corpus_returns_empty() {
        let store = store_with_docs(vec![]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);
        let results = retriever.retrieve("料金", None, 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_type_filter_restricts_candidates() {
        let store = store_with_docs(vec![
            (qa_doc("1", "料金の説明"), vec![1.0, 0.0]),
            (
                Document::new("2", "料金ガイドライン", helpdesk_core::DocumentType::Guideline),
                vec![1.0, 0.0],
            ),
        ]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);

        let results = retriever
            .retrieve("料金", Some(&helpdesk_core::DocumentType::Qa), 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "1");
    }

    #[tokio::test]
    async fn test_vector_only_forces_lexical_weight_zero() {
        let store = store_with_docs(vec![
            (qa_doc("1", "利用単位と料金の説明"), vec![1.0, 0.0]),
            (qa_doc("2", "清掃の手順"), vec![0.0, 1.0]),
        ]);
        let config = RetrieverConfig {
            strategy: SearchStrategy::VectorOnly,
            ..RetrieverConfig::default()
        };
        let retriever = HybridRetriever::new(config, Arc::new(StubEmbedder), store);

        let results = retriever.retrieve("料金について", None, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        // No lexical pass ran; final score is the normalized similarity
        assert_eq!(results[0].lexical_score, 0.0);
        assert_eq!(results[0].document.id, "1");
        assert!((results[0].final_score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_ties_keep_corpus_order() {
        // Identical embeddings and contents: all scores tie
        let store = store_with_docs(vec![
            (qa_doc("first", "同じ内容"), vec![1.0, 0.0]),
            (qa_doc("second", "同じ内容"), vec![1.0, 0.0]),
            (qa_doc("third", "同じ内容"), vec![1.0, 0.0]),
        ]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);

        let results = retriever.retrieve("料金", None, 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_lexical_signal_lifts_unembedded_match() {
        // Doc 2 is a poor vector match but a strong lexical match
        let store = store_with_docs(vec![
            (qa_doc("1", "一般的な案内"), vec![1.0, 0.0]),
            (qa_doc("2", "延長料金は申請が必要です 延長料金の詳細"), vec![0.0, 1.0]),
        ]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);

        let results = retriever.retrieve("延長料金", None, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        let doc2 = results.iter().find(|r| r.document.id == "2").unwrap();
        assert!(doc2.lexical_score > 0.0);
    }

    #[tokio::test]
    async fn test_vector_search_returns_raw_similarity() {
        let store = store_with_docs(vec![(qa_doc("1", "料金"), vec![1.0, 0.0])]);
        let retriever =
            HybridRetriever::new(RetrieverConfig::default(), Arc::new(StubEmbedder), store);

        let results = retriever.vector_search("料金", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].final_score, results[0].vector_score);
    }
}
