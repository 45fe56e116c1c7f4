//! Grounded answer synthesis over retrieved context.

use crate::error::RagError;
use crate::generation::Generator;
use crate::models::{ChatTurn, ScoredChunk};

/// Build the system prompt constraining the answer to the retrieved
/// context. Groundedness is a prompting contract — whatever the capability
/// returns is the answer; there is no way to verify it only used the
/// context.
fn answer_system_prompt(chunks: &[ScoredChunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Answer the user's question based only on the following context. \
         If the context does not contain the information needed to answer, \
         say that the document does not cover it.\n\n{context}"
    )
}

/// Produce an answer grounded in `chunks`, with `history` supplied for
/// conversational continuity (not as a source of facts) and `question` as
/// the final user turn.
pub async fn synthesize_answer(
    generator: &dyn Generator,
    chunks: &[ScoredChunk],
    history: &[ChatTurn],
    question: &str,
) -> Result<String, RagError> {
    let mut conversation = history.to_vec();
    conversation.push(ChatTurn::user(question));

    generator
        .generate(&answer_system_prompt(chunks), &conversation)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::ChatRole;

    struct RecordingGenerator {
        calls: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
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
            Ok("The candidate worked at Acme Corp.".to_string())
        }
    }

    fn scored(index: i64, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk_id: format!("c{index}"),
            chunk_index: index,
            text: text.to_string(),
            score: 1.0,
        }
    }

    #[tokio::test]
    async fn test_prompt_carries_chunks_in_order_and_question_last() {
        let generator = RecordingGenerator {
            calls: Mutex::new(Vec::new()),
        };
        let chunks = vec![scored(0, "Acme Corp, 2019-2024."), scored(1, "Platform team lead.")];
        let history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")];

        let answer = synthesize_answer(&generator, &chunks, &history, "Where did they work?")
            .await
            .unwrap();
        assert!(!answer.is_empty());

        let calls = generator.calls.lock().unwrap();
        let (system, conversation) = &calls[0];
        assert!(system.contains("based only on the following context"));
        let a = system.find("Acme Corp, 2019-2024.").unwrap();
        let b = system.find("Platform team lead.").unwrap();
        assert!(a < b);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation[2].role, ChatRole::User);
        assert_eq!(conversation[2].content, "Where did they work?");
    }

    #[tokio::test]
    async fn test_empty_context_still_prompts() {
        let generator = RecordingGenerator {
            calls: Mutex::new(Vec::new()),
        };
        synthesize_answer(&generator, &[], &[], "Anything?").await.unwrap();
        let calls = generator.calls.lock().unwrap();
        assert!(calls[0].0.contains("does not cover it"));
    }
}
