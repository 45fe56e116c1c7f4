//! Core data models used throughout the ingestion and chat pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Isolation scope for one ingested document's vectors within the index.
///
/// Generated fresh (UUID v4) once per ingestion — never reused, never
/// derived from document content. All retrieval for a conversation is
/// restricted to its namespace, so unrelated documents sharing an index
/// never bleed into each other's answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Generate a fresh, unique namespace.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded, overlapping segment of document text — the unit of retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Unique chunk id, used as the vector id at index time.
    pub id: String,
    /// The source document this chunk was split from.
    pub document_id: String,
    /// Ordinal position within the source document, from 0.
    pub chunk_index: i64,
    pub text: String,
}

/// A chunk paired with its embedding vector, ready for an index write.
/// Immutable once written.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A chunk returned from a namespace query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub chunk_index: i64,
    pub text: String,
    /// Similarity score from the index backend, higher is more relevant.
    pub score: f32,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    /// Some clients label assistant turns `"ai"`; accept both spellings.
    #[serde(alias = "ai")]
    Assistant,
}

/// One ordered (role, content) pair of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_namespaces_are_unique() {
        let a = Namespace::fresh();
        let b = Namespace::fresh();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_chat_turn_roundtrip() {
        let turn = ChatTurn::assistant("Acme Corp.");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"assistant\""));
        let back: ChatTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn test_chat_turn_accepts_ai_role_alias() {
        let turn: ChatTurn = serde_json::from_str(r#"{"role":"ai","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, ChatRole::Assistant);
    }
}
