//! Caller-facing callbacks.
//!
//! A chat operation reports through a [`ChatHandler`]: any number of
//! updates, then exactly one of `on_finish` or `on_error`. The
//! [`FinishGuard`] enforces that ordering no matter how many code paths
//! (stream end, cancellation, degraded response) race to settle.

use nextchat_core::{ChatMessage, MessageContent};

use crate::errors::ChatError;

/// Result of a settled chat operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// Final answer content.
    pub content: MessageContent,
    /// Messages to append to the conversation: tool rounds, then the
    /// final assistant message.
    pub messages: Vec<ChatMessage>,
    /// Request rounds performed.
    pub rounds: u32,
    /// Whether the operation was cancelled; `content` is partial.
    pub cancelled: bool,
}

impl ChatOutcome {
    /// Text of the final answer.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.text_content()
    }
}

/// Receives the progress of a chat operation.
pub trait ChatHandler: Send + Sync {
    /// Called with all text so far and the part added since the last call.
    fn on_update(&self, text: &str, delta: &str) {
        let _ = (text, delta);
    }

    /// Called once when the operation completes or is cancelled.
    fn on_finish(&self, outcome: ChatOutcome);

    /// Called once when the operation fails.
    fn on_error(&self, error: ChatError);
}

/// Ensures a handler is settled at most once.
pub struct FinishGuard<'a> {
    handler: &'a dyn ChatHandler,
    settled: bool,
}

impl<'a> FinishGuard<'a> {
    /// Wrap a handler.
    #[must_use]
    pub fn new(handler: &'a dyn ChatHandler) -> Self {
        Self {
            handler,
            settled: false,
        }
    }

    /// Forward an update unless already settled.
    pub fn update(&self, text: &str, delta: &str) {
        if !self.settled {
            self.handler.on_update(text, delta);
        }
    }

    /// Settle with an outcome. Returns `false` if already settled.
    pub fn finish(&mut self, outcome: ChatOutcome) -> bool {
        if std::mem::replace(&mut self.settled, true) {
            return false;
        }
        self.handler.on_finish(outcome);
        true
    }

    /// Settle with an error. Returns `false` if already settled.
    pub fn fail(&mut self, error: ChatError) -> bool {
        if std::mem::replace(&mut self.settled, true) {
            return false;
        }
        self.handler.on_error(error);
        true
    }

    /// Whether the handler has been settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

impl std::fmt::Debug for FinishGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinishGuard")
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingHandler;
    use super::*;

    fn outcome(text: &str) -> ChatOutcome {
        ChatOutcome {
            content: MessageContent::text(text),
            messages: vec![ChatMessage::assistant(text)],
            rounds: 1,
            cancelled: false,
        }
    }

    #[test]
    fn test_guard_settles_once() {
        let handler = RecordingHandler::default();
        let mut guard = FinishGuard::new(&handler);

        guard.update("a", "a");
        assert!(guard.finish(outcome("a")));
        assert!(!guard.finish(outcome("b")));
        assert!(!guard.fail(ChatError::config("late")));
        guard.update("ab", "b");

        assert!(guard.is_settled());
        assert_eq!(handler.updates.lock().len(), 1);
        assert_eq!(handler.settle_count(), 1);
        assert_eq!(handler.outcome().text(), "a");
    }

    #[test]
    fn test_error_blocks_finish() {
        let handler = RecordingHandler::default();
        let mut guard = FinishGuard::new(&handler);

        assert!(guard.fail(ChatError::config("bad")));
        assert!(!guard.finish(outcome("x")));
        assert!(handler.finished.lock().is_empty());
        assert_eq!(handler.errors.lock().len(), 1);
    }
}
