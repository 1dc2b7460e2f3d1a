//! Qdrant-backed document store
//!
//! Maps the `DocumentStore` contract onto Qdrant: similarity search with a
//! `type` payload filter, and a scroll-based full listing for the lexical
//! pass. Payload layout: `text` holds the content, `type` the corpus
//! partition, every other string value lands in metadata.

use qdrant_client::{
    qdrant::{
        point_id::PointIdOptions, value::Kind, Condition, Filter, RetrievedPoint, ScoredPoint,
        ScrollPointsBuilder, SearchPointsBuilder,
    },
    Qdrant,
};
use std::collections::HashMap;

use async_trait::async_trait;

use helpdesk_config::StoreSettings;
use helpdesk_core::{Document, DocumentStore, DocumentType, Error, Result};

/// Page size for the scroll-based full listing
const SCROLL_PAGE: u32 = 256;

/// Qdrant document store
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
}

impl QdrantStore {
    /// Connect to Qdrant
    pub async fn new(settings: &StoreSettings) -> Result<Self> {
        let mut builder = Qdrant::from_url(&settings.endpoint)
            .timeout(std::time::Duration::from_millis(settings.timeout_ms));

        if let Some(ref api_key) = settings.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| Error::Store(format!("Qdrant connection failed: {}", e)))?;

        Ok(Self {
            client,
            collection: settings.collection.clone(),
        })
    }

    fn type_filter(type_filter: Option<&DocumentType>) -> Option<Filter> {
        type_filter.map(|t| Filter::must([Condition::matches("type", t.as_str().to_string())]))
    }

    fn document_from_payload(
        id: String,
        payload: HashMap<String, qdrant_client::qdrant::Value>,
    ) -> Document {
        let mut content = String::new();
        let mut doc_type = DocumentType::Other(String::new());
        let mut metadata = HashMap::new();

        for (k, v) in payload {
            let Some(Kind::StringValue(s)) = v.kind else {
                continue;
            };
            match k.as_str() {
                "text" => content = s,
                "type" => doc_type = DocumentType::from(s.as_str()),
                _ => {
                    metadata.insert(k, s);
                }
            }
        }

        Document {
            id,
            content,
            doc_type,
            metadata,
        }
    }

    fn point_id_string(options: Option<PointIdOptions>) -> String {
        match options {
            Some(PointIdOptions::Uuid(u)) => u,
            Some(PointIdOptions::Num(n)) => n.to_string(),
            None => String::new(),
        }
    }

    fn scored_point_to_document(point: ScoredPoint) -> (Document, f32) {
        let id = point
            .id
            .map(|pid| Self::point_id_string(pid.point_id_options))
            .unwrap_or_default();
        let score = point.score;
        (Self::document_from_payload(id, point.payload), score)
    }

    fn retrieved_point_to_document(point: RetrievedPoint) -> Document {
        let id = point
            .id
            .map(|pid| Self::point_id_string(pid.point_id_options))
            .unwrap_or_default();
        Self::document_from_payload(id, point.payload)
    }
}

#[async_trait]
impl DocumentStore for QdrantStore {
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
        type_filter: Option<&DocumentType>,
    ) -> Result<Vec<(Document, f32)>> {
        let mut builder =
            SearchPointsBuilder::new(&self.collection, query_vector.to_vec(), k as u64)
                .with_payload(true);

        if let Some(filter) = Self::type_filter(type_filter) {
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| Error::Store(format!("Qdrant search failed: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .map(Self::scored_point_to_document)
            .collect())
    }

    async fn list_all(&self, type_filter: Option<&DocumentType>) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.collection)
                .limit(SCROLL_PAGE)
                .with_payload(true);

            if let Some(filter) = Self::type_filter(type_filter) {
                builder = builder.filter(filter);
            }
            if let Some(offset_id) = offset {
                builder = builder.offset(offset_id);
            }

            let response = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| Error::Store(format!("Qdrant scroll failed: {}", e)))?;

            documents.extend(
                response
                    .result
                    .into_iter()
                    .map(Self::retrieved_point_to_document),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }
}
