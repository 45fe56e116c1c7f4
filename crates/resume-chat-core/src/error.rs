//! Error taxonomy for the ingestion and chat pipeline.
//!
//! Every pipeline step fails fast with the variant for its failure domain;
//! no step retries or recovers locally. Callers (the HTTP layer, the CLI,
//! the session) match on the variant to decide status codes and user-facing
//! wording.

use thiserror::Error;

/// A pipeline failure, one variant per failure domain.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded file could not be parsed into text.
    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    /// The embedding capability failed to vectorize text.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The vector index rejected a write.
    #[error("index write failed: {0}")]
    IndexWrite(String),

    /// The vector index rejected a query.
    #[error("index query failed: {0}")]
    IndexQuery(String),

    /// The generation capability failed or timed out.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The caller supplied an incomplete or malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
