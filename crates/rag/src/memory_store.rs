//! In-memory document store
//!
//! Cosine-similarity store for tests and single-node deployments where
//! running Qdrant is not worth the operational cost. Insertion order is
//! preserved, so `list_all` returns documents in corpus order.

use parking_lot::RwLock;

use async_trait::async_trait;

use helpdesk_core::{Document, DocumentStore, DocumentType, Error, Result};

/// In-memory vector store
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<(Document, Vec<f32>)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with its embedding
    pub fn insert(&self, document: Document, embedding: Vec<f32>) {
        self.records.write().push((document, embedding));
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }

    fn matches(doc: &Document, type_filter: Option<&DocumentType>) -> bool {
        type_filter.map_or(true, |t| &doc.doc_type == t)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        type_filter: Option<&DocumentType>,
    ) -> Result<Vec<(Document, f32)>> {
        if query_vector.is_empty() {
            return Err(Error::Store("empty query vector".to_string()));
        }

        let records = self.records.read();
        let mut scored: Vec<(Document, f32)> = records
            .iter()
            .filter(|(doc, _)| Self::matches(doc, type_filter))
            .map(|(doc, emb)| (doc.clone(), Self::cosine(query_vector, emb)))
            .collect();

        // Stable sort keeps insertion order on ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn list_all(&self, type_filter: Option<&DocumentType>) -> Result<Vec<Document>> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|(doc, _)| Self::matches(doc, type_filter))
            .map(|(doc, _)| doc.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, content: &str, doc_type: DocumentType) -> Document {
        Document::new(id, content, doc_type)
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine() {
        let store = InMemoryStore::new();
        store.insert(doc("1", "a", DocumentType::Qa), vec![1.0, 0.0]);
        store.insert(doc("2", "b", DocumentType::Qa), vec![0.0, 1.0]);

        let results = store.search(&[1.0, 0.1], 10, None).await.unwrap();
        assert_eq!(results[0].0.id, "1");
        assert!(results[0].1 > results[1].1);
    }

    #[tokio::test]
    async fn test_type_filter() {
        let store = InMemoryStore::new();
        store.insert(doc("1", "a", DocumentType::Qa), vec![1.0, 0.0]);
        store.insert(doc("2", "b", DocumentType::Guideline), vec![1.0, 0.0]);

        let results = store
            .search(&[1.0, 0.0], 10, Some(&DocumentType::Guideline))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id, "2");

        let all = store.list_all(Some(&DocumentType::Qa)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "1");
    }

    #[tokio::test]
    async fn test_list_all_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.insert(
                doc(&i.to_string(), "text", DocumentType::Qa),
                vec![1.0, 0.0],
            );
        }
        let all = store.list_all(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let store = InMemoryStore::new();
        let results = store.search(&[1.0], 5, None).await.unwrap();
        assert!(results.is_empty());
        assert!(store.is_empty());
    }
}
