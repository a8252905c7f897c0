//! Per-operation stream state.

use nextchat_core::{generate_session_id, ToolCall};
use nextchat_streaming::{AnimationFrame, Delta, ResponseAnimator, ToolCallAccumulator};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Where a chat operation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Reading frames from an open stream.
    Streaming,
    /// The stream ended with tool calls to run.
    AwaitingToolResults,
    /// The stream ended with a final answer.
    Finished,
    /// Cancelled; partial text is final.
    Cancelled,
    /// Failed; no further rounds.
    Errored,
}

impl SessionState {
    /// Whether no further rounds can start.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Errored)
    }
}

/// State owned by one chat operation across all of its rounds.
///
/// Text accumulates across rounds, so a continuation after a tool round
/// extends what the caller has already seen. Tool calls are collected per
/// round.
#[derive(Debug)]
pub struct StreamSession {
    id: String,
    cancel: CancellationToken,
    tools: ToolCallAccumulator,
    text: String,
    round_text: String,
    animator: ResponseAnimator,
    round: u32,
    state: SessionState,
}

impl StreamSession {
    /// Create a session sharing `cancel`.
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            id: generate_session_id(),
            cancel,
            tools: ToolCallAccumulator::new(),
            text: String::new(),
            round_text: String::new(),
            animator: ResponseAnimator::new(),
            round: 0,
            state: SessionState::Streaming,
        }
    }

    /// Session id, used as a tracing field.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Rounds started so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// All text received so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text received in the current round.
    #[must_use]
    pub fn round_text(&self) -> &str {
        &self.round_text
    }

    /// Tool calls collected in the current round.
    #[must_use]
    pub fn pending_calls(&self) -> &[ToolCall] {
        self.tools.calls()
    }

    /// Cancellation token shared with the transport and tool execution.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the shared cancellation token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Start a new round.
    pub fn begin_round(&mut self) {
        self.round += 1;
        self.round_text.clear();
        self.state = SessionState::Streaming;
        debug!(session_id = %self.id, round = self.round, "Round started");
    }

    /// Apply one parsed frame. Returns `true` when the frame ends the stream.
    pub fn apply(&mut self, delta: Delta) -> bool {
        match delta {
            Delta::Text(text) => {
                self.push_text(&text);
                false
            }
            Delta::ToolCalls(fragments) => {
                self.tools.apply_all(&fragments);
                false
            }
            Delta::Done => true,
            Delta::Empty | Delta::Unparseable(_) => false,
        }
    }

    /// Close the current round's stream, whether it ended with `[DONE]` or
    /// a closed connection.
    pub fn end_stream(&mut self) -> SessionState {
        self.state = if self.tools.is_empty() {
            SessionState::Finished
        } else {
            SessionState::AwaitingToolResults
        };
        debug!(
            session_id = %self.id,
            round = self.round,
            state = ?self.state,
            tool_calls = self.tools.len(),
            "Stream ended"
        );
        self.state
    }

    /// Take the tool calls collected this round.
    pub fn take_calls(&mut self) -> Vec<ToolCall> {
        self.tools.take_calls()
    }

    /// Append diagnostic text that replaces the rest of the answer.
    pub fn degrade(&mut self, diagnostic: &str) {
        let text = if self.text.is_empty() {
            diagnostic.to_string()
        } else {
            format!("\n\n{diagnostic}")
        };
        self.push_text(&text);
        self.state = SessionState::Finished;
    }

    /// Mark the session cancelled.
    pub fn cancel(&mut self) {
        self.state = SessionState::Cancelled;
    }

    /// Mark the session failed.
    pub fn fail(&mut self) {
        self.state = SessionState::Errored;
    }

    /// Release the next animation frame.
    pub fn tick(&mut self) -> Option<AnimationFrame> {
        self.animator.tick()
    }

    /// Release everything still buffered, once.
    pub fn flush(&mut self) -> Option<AnimationFrame> {
        let before = self.animator.delivered().len();
        let text = self.animator.finish()?;
        let delta = text[before..].to_string();
        (!delta.is_empty()).then_some(AnimationFrame { text, delta })
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.round_text.push_str(text);
        self.animator.push(text);
    }
}
