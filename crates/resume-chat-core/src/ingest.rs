//! Ingestion pipeline: chunk, embed, and index a document under a fresh
//! namespace.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::chunk::split_text;
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::models::{EmbeddedChunk, Namespace};

/// Chunk size used at ingestion, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Overlap between adjacent chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
/// Upper bound on concurrent embed/index-write operations per ingestion.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Chunking and concurrency settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Ingest extracted document text and return the fresh namespace its chunks
/// were indexed under.
///
/// The namespace reaches the caller only on success. A failure partway
/// through leaves at most a partially populated namespace that is never
/// referenced again; the index write is not transactional and no cleanup
/// runs.
pub async fn ingest(
    text: &str,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    config: &IngestConfig,
) -> Result<Namespace, RagError> {
    let namespace = Namespace::fresh();
    let chunks = split_text(
        namespace.as_str(),
        text,
        config.chunk_size,
        config.chunk_overlap,
    );

    stream::iter(chunks)
        .map(Ok::<_, RagError>)
        .try_for_each_concurrent(config.max_concurrency.max(1), |chunk| {
            let namespace = &namespace;
            async move {
                let vector = embed_query(embedder, &chunk.text).await?;
                index
                    .upsert(namespace, &[EmbeddedChunk { chunk, vector }])
                    .await
            }
        })
        .await?;

    Ok(namespace)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::index::memory::InMemoryIndex;

    /// Deterministic fake: vector = [len, vowel count], plus a call counter.
    struct CountingEmbedder {
        calls: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_after: None,
            }
        }

        fn failing_after(n: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_after: Some(n),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        fn model_name(&self) -> &str {
            "fake-embedder"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(limit) = self.fail_after {
                if n >= limit {
                    return Err(RagError::Embedding("quota exhausted".to_string()));
                }
            }
            Ok(texts
                .iter()
                .map(|t| {
                    let vowels = t.chars().filter(|c| "aeiou".contains(*c)).count();
                    vec![t.len() as f32, vowels as f32]
                })
                .collect())
        }
    }

    fn three_chunk_config() -> IngestConfig {
        IngestConfig {
            chunk_size: 40,
            chunk_overlap: 5,
            max_concurrency: 5,
        }
    }

    const DOC: &str = "Worked at Acme Corp for five years.\n\nLed the platform team on search.\n\nHolds a degree in mathematics.";

    #[tokio::test]
    async fn test_ingest_indexes_every_chunk() {
        let embedder = CountingEmbedder::new();
        let index = InMemoryIndex::new();

        let ns = ingest(DOC, &embedder, &index, &three_chunk_config())
            .await
            .unwrap();

        let results = index.query(&ns, &[1.0, 1.0], 100).await.unwrap();
        assert_eq!(results.len(), embedder.calls.load(Ordering::SeqCst));
        assert!(results.len() >= 3);
        let mut indices: Vec<i64> = results.iter().map(|r| r.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..results.len() as i64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_ingest_returns_distinct_namespaces() {
        let embedder = CountingEmbedder::new();
        let index = InMemoryIndex::new();

        let a = ingest(DOC, &embedder, &index, &three_chunk_config())
            .await
            .unwrap();
        let b = ingest(DOC, &embedder, &index, &three_chunk_config())
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_ingest_surfaces_embedding_failure() {
        let embedder = CountingEmbedder::failing_after(1);
        let index = InMemoryIndex::new();

        let err = ingest(DOC, &embedder, &index, &three_chunk_config())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_ingest_empty_text_yields_queryable_empty_namespace() {
        let embedder = CountingEmbedder::new();
        let index = InMemoryIndex::new();

        let ns = ingest("", &embedder, &index, &three_chunk_config())
            .await
            .unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        let results = index.query(&ns, &[1.0, 0.0], 4).await.unwrap();
        assert!(results.is_empty());
    }
}
