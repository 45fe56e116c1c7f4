//! Generation capability trait.

use async_trait::async_trait;

use crate::error::RagError;
use crate::models::ChatTurn;

/// A capability that produces free text from system instructions plus a
/// conversation.
///
/// Latency is bounded by the provider's own timeout, not guaranteed here;
/// callers treat every invocation as a suspension point.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-2.0-flash"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for `conversation` under `system` instructions.
    async fn generate(&self, system: &str, conversation: &[ChatTurn])
        -> Result<String, RagError>;
}
