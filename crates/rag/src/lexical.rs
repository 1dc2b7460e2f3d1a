//! BM25 Okapi lexical scoring
//!
//! Scores a per-request candidate corpus against a tokenized query. The
//! corpus here is the filtered document set fetched from the store for one
//! request, so there is no persistent index; document frequencies and
//! length norms are computed on the fly.

use std::collections::HashMap;

/// BM25 tuning parameters
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Term-frequency relevance scorer over a candidate document set
#[derive(Debug, Clone, Default)]
pub struct LexicalScorer {
    params: Bm25Params,
}

impl LexicalScorer {
    pub fn new(params: Bm25Params) -> Self {
        Self { params }
    }

    /// BM25 score of every document against the query, in input order.
    ///
    /// Empty query or empty corpus yields all-zero scores.
    pub fn score_all(&self, documents: &[Vec<String>], query: &[String]) -> Vec<f32> {
        let n = documents.len();
        if n == 0 {
            return Vec::new();
        }
        if query.is_empty() {
            return vec![0.0; n];
        }

        let doc_lengths: Vec<f32> = documents.iter().map(|d| d.len() as f32).collect();
        let total_len: f32 = doc_lengths.iter().sum();
        let avgdl = (total_len / n as f32).max(1.0);

        // Term frequencies per document, document frequency per query term
        let term_freqs: Vec<HashMap<&str, u32>> = documents
            .iter()
            .map(|doc| {
                let mut tf: HashMap<&str, u32> = HashMap::new();
                for token in doc {
                    *tf.entry(token.as_str()).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        let mut scores = vec![0.0f32; n];
        let k1 = self.params.k1;
        let b = self.params.b;

        for term in Self::unique(query) {
            let df = term_freqs.iter().filter(|tf| tf.contains_key(term)).count() as f32;
            if df == 0.0 {
                continue;
            }
            // IDF: ln((N - df + 0.5) / (df + 0.5) + 1)
            let idf = ((n as f32 - df + 0.5) / (df + 0.5) + 1.0).ln();

            for (i, tf_map) in term_freqs.iter().enumerate() {
                let tf = *tf_map.get(term).unwrap_or(&0) as f32;
                if tf == 0.0 {
                    continue;
                }
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * doc_lengths[i] / avgdl));
                scores[i] += idf * tf_norm;
            }
        }

        scores
    }

    fn unique(tokens: &[String]) -> Vec<&str> {
        let mut seen = Vec::new();
        for token in tokens {
            if !seen.contains(&token.as_str()) {
                seen.push(token.as_str());
            }
        }
        seen
    }
}
