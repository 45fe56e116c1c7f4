//! Embedding providers.
//!
//! Two backends implement the core [`EmbeddingProvider`] trait:
//! - **[`GoogleEmbedding`]** — the Google Generative Language
//!   `batchEmbedContents` endpoint (`text-embedding-004` by default).
//! - **[`OllamaEmbedding`]** — a local Ollama instance's `/api/embed`
//!   endpoint, for development without an API key.
//!
//! Both batch all texts into a single HTTP call and retry transient
//! failures with exponential backoff (see [`crate::http`]). The provider
//! instance is constructed once and serves both the ingestion and query
//! paths, keeping the embedding space consistent.

use std::time::Duration;

use async_trait::async_trait;

use resume_chat_core::embedding::EmbeddingProvider;
use resume_chat_core::error::RagError;

use crate::config::EmbeddingConfig;
use crate::http::{post_json_with_retry, GOOGLE_API_BASE, GOOGLE_API_KEY_VAR};

/// Create the embedding provider selected by `config.provider`.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "google" => Ok(Box::new(GoogleEmbedding::new(config)?)),
        "ollama" => Ok(Box::new(OllamaEmbedding::new(config)?)),
        other => anyhow::bail!("Unknown embedding provider: {}", other),
    }
}

// ============ Google provider ============

/// Embedding provider backed by the Google Generative Language API.
///
/// Requires the `GOOGLE_API_KEY` environment variable.
pub struct GoogleEmbedding {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl GoogleEmbedding {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(GOOGLE_API_KEY_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", GOOGLE_API_KEY_VAR))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GoogleEmbedding {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!(
            "{GOOGLE_API_BASE}/models/{}:batchEmbedContents?key={}",
            self.model, self.api_key
        );
        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                serde_json::json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();
        let body = serde_json::json!({ "requests": requests });

        let json = post_json_with_retry(&self.client, &url, &[], &body, self.max_retries)
            .await
            .map_err(RagError::Embedding)?;
        parse_google_embeddings(&json)
    }
}

/// Extract the `embeddings[].values` arrays, in input order.
fn parse_google_embeddings(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, RagError> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| RagError::Embedding("invalid response: missing embeddings array".to_string()))?;

    let mut result = Vec::with_capacity(embeddings.len());
    for item in embeddings {
        let values = item
            .get("values")
            .and_then(|v| v.as_array())
            .ok_or_else(|| RagError::Embedding("invalid response: missing values".to_string()))?;
        result.push(
            values
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect(),
        );
    }

    Ok(result)
}

// ============ Ollama provider ============

/// Embedding provider backed by a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured URL (default
/// `http://localhost:11434`). Requires an embedding model to be pulled
/// (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaEmbedding {
    client: reqwest::Client,
    url: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OllamaEmbedding {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/api/embed", self.url);
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let json = post_json_with_retry(&self.client, &url, &[], &body, self.max_retries)
            .await
            .map_err(|e| RagError::Embedding(format!("Ollama at {}: {}", self.url, e)))?;
        parse_ollama_embeddings(&json)
    }
}

fn parse_ollama_embeddings(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, RagError> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| RagError::Embedding("invalid response: missing embeddings array".to_string()))?;

    let mut result = Vec::with_capacity(embeddings.len());
    for embedding in embeddings {
        let vec: Vec<f32> = embedding
            .as_array()
            .ok_or_else(|| RagError::Embedding("invalid response: embedding is not an array".to_string()))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        result.push(vec);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_google_embeddings() {
        let json = serde_json::json!({
            "embeddings": [
                { "values": [0.1, 0.2, 0.3] },
                { "values": [0.4, 0.5, 0.6] },
            ]
        });
        let vecs = parse_google_embeddings(&json).unwrap();
        assert_eq!(vecs.len(), 2);
        assert_eq!(vecs[0].len(), 3);
        assert!((vecs[1][0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_parse_google_missing_embeddings_errors() {
        let json = serde_json::json!({ "error": { "message": "bad key" } });
        let err = parse_google_embeddings(&json).unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[test]
    fn test_parse_ollama_embeddings() {
        let json = serde_json::json!({ "embeddings": [[1.0, 2.0], [3.0, 4.0]] });
        let vecs = parse_ollama_embeddings(&json).unwrap();
        assert_eq!(vecs, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }
}
