//! In-memory [`VectorIndex`] for tests and single-process deployments.
//!
//! Vectors live in a `HashMap` keyed by namespace behind `std::sync::RwLock`.
//! Queries are brute-force cosine similarity over the namespace's vectors —
//! fine at the scale of one document's chunks.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::error::RagError;
use crate::models::{EmbeddedChunk, Namespace, ScoredChunk};

use super::VectorIndex;

struct StoredVector {
    chunk_id: String,
    chunk_index: i64,
    text: String,
    vector: Vec<f32>,
}

/// Brute-force in-memory vector index.
#[derive(Default)]
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<StoredVector>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(
        &self,
        namespace: &Namespace,
        chunks: &[EmbeddedChunk],
    ) -> Result<(), RagError> {
        let mut namespaces = self.namespaces.write().unwrap();
        let stored = namespaces.entry(namespace.as_str().to_string()).or_default();
        for ec in chunks {
            stored.retain(|sv| sv.chunk_id != ec.chunk.id);
            stored.push(StoredVector {
                chunk_id: ec.chunk.id.clone(),
                chunk_index: ec.chunk.chunk_index,
                text: ec.chunk.text.clone(),
                vector: ec.vector.clone(),
            });
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let namespaces = self.namespaces.read().unwrap();
        let stored = match namespaces.get(namespace.as_str()) {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };

        let mut results: Vec<ScoredChunk> = stored
            .iter()
            .map(|sv| ScoredChunk {
                chunk_id: sv.chunk_id.clone(),
                chunk_index: sv.chunk_index,
                text: sv.text.clone(),
                score: cosine_similarity(vector, &sv.vector),
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn embedded(id: &str, index: i64, text: &str, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: Chunk {
                id: id.to_string(),
                document_id: "doc".to_string(),
                chunk_index: index,
                text: text.to_string(),
            },
            vector,
        }
    }

    #[tokio::test]
    async fn test_query_orders_by_similarity_and_truncates() {
        let index = InMemoryIndex::new();
        let ns = Namespace::fresh();
        index
            .upsert(
                &ns,
                &[
                    embedded("a", 0, "alpha", vec![1.0, 0.0]),
                    embedded("b", 1, "beta", vec![0.0, 1.0]),
                    embedded("c", 2, "gamma", vec![0.9, 0.1]),
                ],
            )
            .await
            .unwrap();

        let results = index.query(&ns, &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "a");
        assert_eq!(results[1].chunk_id, "c");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_unknown_namespace_returns_empty() {
        let index = InMemoryIndex::new();
        let results = index
            .query(&Namespace::from("nowhere"), &[1.0, 0.0], 4)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let index = InMemoryIndex::new();
        let ns_a = Namespace::fresh();
        let ns_b = Namespace::fresh();
        index
            .upsert(&ns_a, &[embedded("a", 0, "from a", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert(&ns_b, &[embedded("b", 0, "from b", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = index.query(&ns_a, &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "from a");
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_chunk_id() {
        let index = InMemoryIndex::new();
        let ns = Namespace::fresh();
        index
            .upsert(&ns, &[embedded("a", 0, "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert(&ns, &[embedded("a", 0, "new", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = index.query(&ns, &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "new");
    }
}
