//! Vector index backends.
//!
//! - **memory** — the core crate's [`InMemoryIndex`]; single-process
//!   deployments where ingestion and chat share one server.
//! - **pinecone** — the Pinecone data plane (`/vectors/upsert`, `/query`),
//!   scoped to one index host. Chunk text and ordinal ride along as vector
//!   metadata so retrieval needs no secondary lookup.

use std::time::Duration;

use async_trait::async_trait;

use resume_chat_core::error::RagError;
use resume_chat_core::index::memory::InMemoryIndex;
use resume_chat_core::index::VectorIndex;
use resume_chat_core::models::{EmbeddedChunk, Namespace, ScoredChunk};

use crate::config::IndexConfig;
use crate::http::post_json_with_retry;

/// Environment variable holding the Pinecone API key.
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

/// Create the vector index selected by `config.provider`.
pub fn create_index(config: &IndexConfig) -> anyhow::Result<Box<dyn VectorIndex>> {
    match config.provider.as_str() {
        "memory" => Ok(Box::new(InMemoryIndex::new())),
        "pinecone" => Ok(Box::new(PineconeIndex::new(config)?)),
        other => anyhow::bail!("Unknown index provider: {}", other),
    }
}

/// Pinecone data-plane client scoped to one index host.
///
/// Requires the `PINECONE_API_KEY` environment variable.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
    max_retries: u32,
}

impl PineconeIndex {
    pub fn new(config: &IndexConfig) -> anyhow::Result<Self> {
        let host = config
            .host
            .clone()
            .ok_or_else(|| anyhow::anyhow!("index.host must be set for the pinecone provider"))?;
        let api_key = std::env::var(PINECONE_API_KEY_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", PINECONE_API_KEY_VAR))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
            max_retries: 3,
        })
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("Api-Key", self.api_key.clone())]
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(
        &self,
        namespace: &Namespace,
        chunks: &[EmbeddedChunk],
    ) -> Result<(), RagError> {
        let vectors: Vec<serde_json::Value> = chunks
            .iter()
            .map(|ec| {
                serde_json::json!({
                    "id": ec.chunk.id,
                    "values": ec.vector,
                    "metadata": {
                        "document_id": ec.chunk.document_id,
                        "chunk_index": ec.chunk.chunk_index,
                        "text": ec.chunk.text,
                    },
                })
            })
            .collect();
        let body = serde_json::json!({
            "vectors": vectors,
            "namespace": namespace.as_str(),
        });

        let url = format!("{}/vectors/upsert", self.host);
        post_json_with_retry(&self.client, &url, &self.headers(), &body, self.max_retries)
            .await
            .map(|_| ())
            .map_err(RagError::IndexWrite)
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "namespace": namespace.as_str(),
            "includeMetadata": true,
        });

        let url = format!("{}/query", self.host);
        let json = post_json_with_retry(&self.client, &url, &self.headers(), &body, self.max_retries)
            .await
            .map_err(RagError::IndexQuery)?;
        parse_query_matches(&json)
    }
}

/// Parse a query response. A missing or empty `matches` array (e.g. a
/// namespace the index has never seen) is an empty result, not an error.
fn parse_query_matches(json: &serde_json::Value) -> Result<Vec<ScoredChunk>, RagError> {
    let matches = match json.get("matches").and_then(|m| m.as_array()) {
        Some(m) => m,
        None => return Ok(Vec::new()),
    };

    Ok(matches
        .iter()
        .map(|m| {
            let metadata = m.get("metadata");
            ScoredChunk {
                chunk_id: m
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                chunk_index: metadata
                    .and_then(|md| md.get("chunk_index"))
                    .and_then(|v| v.as_i64())
                    .unwrap_or(0),
                text: metadata
                    .and_then(|md| md.get("text"))
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score: m.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_matches() {
        let json = serde_json::json!({
            "matches": [
                {
                    "id": "chunk-1",
                    "score": 0.92,
                    "metadata": { "document_id": "ns", "chunk_index": 0, "text": "Acme Corp" }
                },
                {
                    "id": "chunk-2",
                    "score": 0.41,
                    "metadata": { "document_id": "ns", "chunk_index": 1, "text": "State University" }
                }
            ],
            "namespace": "ns"
        });
        let chunks = parse_query_matches(&json).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_id, "chunk-1");
        assert_eq!(chunks[0].text, "Acme Corp");
        assert!((chunks[0].score - 0.92).abs() < 1e-6);
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_missing_matches_is_empty_not_error() {
        let json = serde_json::json!({ "namespace": "unknown" });
        assert!(parse_query_matches(&json).unwrap().is_empty());
    }
}
