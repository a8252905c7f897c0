//! Continuation decisions between rounds.
//!
//! When a round's stream ends, the controller decides whether the answer is
//! final or whether tool calls must run first. After the tools ran, it
//! appends exactly one assistant tool-call message and one tool-result
//! message per call, and the next request is built from that history.

use nextchat_core::{ChatMessage, ToolCall};
use tracing::{info, warn};

use crate::errors::{ChatError, ChatResult};
use crate::session::{SessionState, StreamSession};

/// What to do after a round's stream ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// The accumulated text is the final answer.
    Finish,
    /// Run these calls and start another round.
    RunTools(Vec<ToolCall>),
}

/// Decides between finishing and running another tool round.
#[derive(Debug, Clone, Copy)]
pub struct ContinuationController {
    max_rounds: u32,
}

impl ContinuationController {
    /// Create a controller allowing at most `max_rounds` request rounds.
    #[must_use]
    pub fn new(max_rounds: u32) -> Self {
        Self { max_rounds }
    }

    /// Round limit.
    #[must_use]
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Close the session's current stream and decide what follows.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::MaxRoundsExceeded` when tools were requested on
    /// the last allowed round.
    pub fn after_stream(&self, session: &mut StreamSession) -> ChatResult<Continuation> {
        match session.end_stream() {
            SessionState::AwaitingToolResults if session.round() >= self.max_rounds => {
                warn!(
                    session_id = session.id(),
                    rounds = session.round(),
                    "Tool round limit reached"
                );
                session.fail();
                Err(ChatError::MaxRoundsExceeded {
                    rounds: session.round(),
                })
            }
            SessionState::AwaitingToolResults => {
                let calls = session.take_calls();
                info!(
                    session_id = session.id(),
                    round = session.round(),
                    tool_calls = calls.len(),
                    "Awaiting tool results"
                );
                Ok(Continuation::RunTools(calls))
            }
            _ => Ok(Continuation::Finish),
        }
    }

    /// Record one completed tool round.
    ///
    /// Pushes the assistant message carrying `calls`, then `results`, onto
    /// both the conversation used for the next request and the list of
    /// messages reported to the caller.
    pub fn append_tool_round(
        conversation: &mut Vec<ChatMessage>,
        appended: &mut Vec<ChatMessage>,
        content: &str,
        calls: Vec<ToolCall>,
        results: Vec<ChatMessage>,
    ) {
        let round = std::iter::once(ChatMessage::assistant_tool_calls(content, calls))
            .chain(results)
            .collect::<Vec<_>>();
        conversation.extend(round.iter().cloned());
        appended.extend(round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextchat_core::Role;
    use nextchat_streaming::{Delta, ToolCallFragment};
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    fn session_with_call() -> StreamSession {
        let mut session = StreamSession::new(CancellationToken::new());
        session.begin_round();
        session.apply(Delta::ToolCalls(vec![ToolCallFragment::start(
            0, "call_1", "now", "{}",
        )]));
        session
    }

    #[test]
    fn test_text_only_round_finishes() {
        let mut session = StreamSession::new(CancellationToken::new());
        session.begin_round();
        session.apply(Delta::Text("done".into()));

        let next = ContinuationController::new(10).after_stream(&mut session).unwrap();
        assert_eq!(next, Continuation::Finish);
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn test_tool_round_yields_calls() {
        let mut session = session_with_call();
        let next = ContinuationController::new(10).after_stream(&mut session).unwrap();

        match next {
            Continuation::RunTools(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name(), "now");
            }
            other => panic!("expected tool round, got {other:?}"),
        }
        assert!(session.pending_calls().is_empty());
    }

    #[test]
    fn test_round_limit() {
        let mut session = session_with_call();
        let err = ContinuationController::new(1)
            .after_stream(&mut session)
            .unwrap_err();

        assert!(matches!(err, ChatError::MaxRoundsExceeded { rounds: 1 }));
        assert_eq!(session.state(), SessionState::Errored);
    }

    #[test]
    fn test_append_adds_two_messages_for_one_call() {
        let mut conversation = vec![ChatMessage::user("what time is it?")];
        let mut appended = Vec::new();
        let call = ToolCall::function("call_1", "now", "{}");

        ContinuationController::append_tool_round(
            &mut conversation,
            &mut appended,
            "",
            vec![call.clone()],
            vec![ChatMessage::tool("call_1", "12:00")],
        );

        assert_eq!(conversation.len(), 3);
        assert_eq!(appended.len(), 2);
        assert_eq!(conversation[1].tool_calls, Some(vec![call]));
        assert_eq!(conversation[2].role, Role::Tool);
        assert_eq!(conversation[1..], appended[..]);
    }
}
