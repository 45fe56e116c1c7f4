//! Vector index capability: namespace-scoped storage and nearest-neighbor
//! retrieval.
//!
//! Namespaces isolate unrelated documents inside a shared index — a query
//! scoped to one namespace never observes vectors written under another.
//! Writes are additive; nothing in this interface deletes or mutates stored
//! vectors, so an abandoned namespace simply goes unreferenced.

pub mod memory;

use async_trait::async_trait;

use crate::error::RagError;
use crate::models::{EmbeddedChunk, Namespace, ScoredChunk};

/// Abstract vector index backend.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Write embedded chunks under `namespace`.
    async fn upsert(
        &self,
        namespace: &Namespace,
        chunks: &[EmbeddedChunk],
    ) -> Result<(), RagError>;

    /// Return up to `top_k` chunks nearest to `vector` within `namespace`,
    /// ordered by descending score.
    ///
    /// A namespace with no indexed chunks (including one the index has
    /// never seen) yields an empty Vec, not an error.
    async fn query(
        &self,
        namespace: &Namespace,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RagError>;
}
