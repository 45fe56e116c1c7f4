//! History-aware query rewriting.
//!
//! Follow-up questions ("When?", "What about there?") are meaningless to a
//! similarity search on their own. Before retrieval, the question is
//! reformulated into a standalone one using the conversation history to
//! resolve referents.

use crate::error::RagError;
use crate::generation::Generator;
use crate::models::ChatTurn;

/// System instruction for the reformulation call. The model is told not to
/// answer; that contract is not enforced locally — whatever comes back is
/// used as the retrieval query.
pub const REWRITE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can \
be understood without the chat history. Do NOT answer the question, just reformulate it if \
needed and otherwise return it as is.";

/// Rewrite `question` into a standalone question, using `history` to
/// resolve referents.
///
/// An empty history short-circuits to the question itself with no
/// generation call.
pub async fn rewrite_question(
    generator: &dyn Generator,
    history: &[ChatTurn],
    question: &str,
) -> Result<String, RagError> {
    if history.is_empty() {
        return Ok(question.to_string());
    }

    let mut conversation = history.to_vec();
    conversation.push(ChatTurn::user(question));

    let rewritten = generator
        .generate(REWRITE_SYSTEM_PROMPT, &conversation)
        .await?;
    Ok(rewritten.trim().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::ChatRole;

    /// Returns a canned reply and records every call it receives.
    struct ScriptedGenerator {
        reply: String,
        calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    impl ScriptedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        fn model_name(&self) -> &str {
            "scripted"
        }
        async fn generate(
            &self,
            system: &str,
            conversation: &[ChatTurn],
        ) -> Result<String, RagError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), conversation.to_vec()));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_empty_history_is_a_no_op() {
        let generator = ScriptedGenerator::new("should never be used");
        let out = rewrite_question(&generator, &[], "What is the candidate's most recent job title?")
            .await
            .unwrap();
        assert_eq!(out, "What is the candidate's most recent job title?");
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rewrite_passes_history_and_question_to_generator() {
        let generator = ScriptedGenerator::new("When did the candidate work at Acme Corp?");
        let history = vec![
            ChatTurn::user("Where did they work?"),
            ChatTurn::assistant("Acme Corp."),
        ];

        let out = rewrite_question(&generator, &history, "When?").await.unwrap();
        assert_eq!(out, "When did the candidate work at Acme Corp?");

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, conversation) = &calls[0];
        assert_eq!(system, REWRITE_SYSTEM_PROMPT);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation[0].content, "Where did they work?");
        assert_eq!(conversation[2].role, ChatRole::User);
        assert_eq!(conversation[2].content, "When?");
    }

    #[tokio::test]
    async fn test_rewrite_trims_but_does_not_validate() {
        let generator = ScriptedGenerator::new("  not even a question  ");
        let history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")];
        let out = rewrite_question(&generator, &history, "and?").await.unwrap();
        assert_eq!(out, "not even a question");
    }
}
