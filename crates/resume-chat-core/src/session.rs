//! Conversation session: the per-turn pipeline and the state machine that
//! owns a conversation's history.
//!
//! One turn runs rewrite → retrieve → synthesize in strict sequence, each
//! step feeding the next. The stateless [`run_turn`] serves callers that
//! carry history themselves (the HTTP chat surface); [`ChatSession`] owns
//! history for long-lived callers (the CLI chat loop).

use crate::embedding::EmbeddingProvider;
use crate::error::RagError;
use crate::generation::Generator;
use crate::index::VectorIndex;
use crate::models::{ChatTurn, Namespace};
use crate::retrieve::{retrieve_chunks, DEFAULT_TOP_K};
use crate::rewrite::rewrite_question;
use crate::synthesize::synthesize_answer;

/// Run one chat turn against `namespace`: rewrite the question with
/// `history`, retrieve the most relevant chunks, and synthesize a grounded
/// answer.
///
/// `history` is read-only here, so a failed or cancelled turn leaves no
/// trace. Callers that persist history append the (user, assistant) pair
/// only after this returns `Ok`.
pub async fn run_turn(
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    generator: &dyn Generator,
    namespace: &Namespace,
    history: &[ChatTurn],
    question: &str,
    top_k: usize,
) -> Result<String, RagError> {
    if question.trim().is_empty() {
        return Err(RagError::InvalidRequest(
            "question must not be empty".to_string(),
        ));
    }

    let standalone = rewrite_question(generator, history, question).await?;
    let chunks = retrieve_chunks(embedder, index, namespace, &standalone, top_k).await?;
    synthesize_answer(generator, &chunks, history, question).await
}

/// Session lifecycle. A session loops `Ready → Thinking → Ready` for each
/// turn and returns to `AwaitingDocument` only on an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No document ingested yet; questions are rejected.
    AwaitingDocument,
    /// A namespace is attached and a question may be asked.
    Ready(Namespace),
    /// A turn is in flight.
    Thinking(Namespace),
}

/// A single conversation bound to one namespace, owning its history.
///
/// Turns are strictly serialized: [`ask`](Self::ask) takes `&mut self`, so
/// at most one turn is in flight per session. History grows by exactly one
/// (user, assistant) pair per successful turn, in submission order, and
/// never changes on failure.
pub struct ChatSession {
    state: SessionState,
    history: Vec<ChatTurn>,
    top_k: usize,
}

impl ChatSession {
    /// New session with no document attached.
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitingDocument,
            history: Vec::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Session already bound to an ingested namespace.
    pub fn with_namespace(namespace: Namespace) -> Self {
        Self {
            state: SessionState::Ready(namespace),
            history: Vec::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.top_k = top_k.max(1);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Ordered question/answer turns so far.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        match &self.state {
            SessionState::AwaitingDocument => None,
            SessionState::Ready(ns) | SessionState::Thinking(ns) => Some(ns),
        }
    }

    /// Attach the namespace of a newly ingested document.
    ///
    /// Only valid while awaiting a document; [`reset`](Self::reset) first
    /// to switch to a different document.
    pub fn attach(&mut self, namespace: Namespace) -> Result<(), RagError> {
        match self.state {
            SessionState::AwaitingDocument => {
                self.state = SessionState::Ready(namespace);
                Ok(())
            }
            _ => Err(RagError::InvalidRequest(
                "a document is already attached to this conversation".to_string(),
            )),
        }
    }

    /// Discard the namespace reference and clear history.
    ///
    /// The indexed vectors themselves are not deleted; the namespace is
    /// simply never queried again.
    pub fn reset(&mut self) {
        self.state = SessionState::AwaitingDocument;
        self.history.clear();
    }

    /// Ask a question and, on success, record the (user, assistant) pair.
    pub async fn ask(
        &mut self,
        embedder: &dyn EmbeddingProvider,
        index: &dyn VectorIndex,
        generator: &dyn Generator,
        question: &str,
    ) -> Result<String, RagError> {
        let namespace = match &self.state {
            SessionState::Ready(ns) => ns.clone(),
            SessionState::AwaitingDocument => {
                return Err(RagError::InvalidRequest(
                    "no document has been ingested for this conversation".to_string(),
                ))
            }
            SessionState::Thinking(_) => {
                return Err(RagError::InvalidRequest(
                    "a turn is already in flight".to_string(),
                ))
            }
        };

        // Restores Ready even if the turn future is dropped mid-flight.
        struct Settle<'a> {
            state: &'a mut SessionState,
            namespace: Namespace,
        }
        impl Drop for Settle<'_> {
            fn drop(&mut self) {
                *self.state = SessionState::Ready(self.namespace.clone());
            }
        }

        let top_k = self.top_k;
        let history = &self.history;
        let state = &mut self.state;
        *state = SessionState::Thinking(namespace.clone());
        let settle = Settle {
            state,
            namespace: namespace.clone(),
        };

        let result = run_turn(
            embedder, index, generator, &namespace, history, question, top_k,
        )
        .await;
        drop(settle);

        let answer = result?;
        self.history.push(ChatTurn::user(question));
        self.history.push(ChatTurn::assistant(answer.clone()));
        Ok(answer)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
