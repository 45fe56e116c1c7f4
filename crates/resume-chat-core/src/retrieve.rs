//! Namespace-scoped retrieval of the most relevant chunks.

use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::models::{Namespace, ScoredChunk};

/// Chunks fetched per question when the caller does not override it.
pub const DEFAULT_TOP_K: usize = 4;

/// Embed `question` and return up to `top_k` nearest chunks within
/// `namespace`, ordered by descending relevance.
///
/// The question is embedded with the same provider that embedded the
/// chunks at ingestion; similarity against vectors from a different model
/// would be meaningless. A topically unrelated question still returns the
/// nearest chunks — an empty result only means the namespace holds nothing.
pub async fn retrieve_chunks(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    namespace: &Namespace,
    question: &str,
    top_k: usize,
) -> Result<Vec<ScoredChunk>, RagError> {
    let query_vec = embed_query(embedder, question).await?;
    index.query(namespace, &query_vec, top_k).await
}
