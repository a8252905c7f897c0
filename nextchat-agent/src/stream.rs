//! Chat operations as a stream of events.
//!
//! [`ChatClient::chat_stream`] spawns the orchestrator on the runtime and
//! forwards its callbacks through a channel, for callers that would rather
//! poll a [`Stream`] than implement [`ChatHandler`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use nextchat_core::{ChatMessage, ModelConfig};
use nextchat_tools::ToolRegistry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::chat::ChatClient;
use crate::errors::ChatError;
use crate::handler::{ChatHandler, ChatOutcome};

/// Events emitted by a streamed chat operation.
#[derive(Debug)]
pub enum ChatEvent {
    /// Paced text update.
    Update {
        /// All text so far.
        text: String,
        /// Text added by this update.
        delta: String,
    },
    /// The operation completed or was cancelled.
    Finished(ChatOutcome),
    /// The operation failed.
    Failed(ChatError),
}

impl ChatEvent {
    /// Whether this event settles the operation.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_) | Self::Failed(_))
    }
}

struct ChannelHandler {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelHandler {
    fn send(&self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            debug!("ChatStream: receiver dropped");
        }
    }
}

impl ChatHandler for ChannelHandler {
    fn on_update(&self, text: &str, delta: &str) {
        self.send(ChatEvent::Update {
            text: text.to_string(),
            delta: delta.to_string(),
        });
    }

    fn on_finish(&self, outcome: ChatOutcome) {
        self.send(ChatEvent::Finished(outcome));
    }

    fn on_error(&self, error: ChatError) {
        self.send(ChatEvent::Failed(error));
    }
}

/// A running chat operation.
///
/// Ends after its terminal event. Dropping it cancels the operation.
pub struct ChatStream {
    rx: mpsc::UnboundedReceiver<ChatEvent>,
    cancel: CancellationToken,
}

impl ChatStream {
    /// Cancel the operation; a `Finished` event with partial text follows.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for ChatStream {
    type Item = ChatEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Run a chat operation on a spawned task and stream its events.
    ///
    /// Must be called within a Tokio runtime. Cancelling `cancel` or
    /// dropping the returned stream cancels the operation.
    pub fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        config: ModelConfig,
        tools: ToolRegistry,
        cancel: &CancellationToken,
    ) -> ChatStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = cancel.child_token();
        let client = self.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            let handler = ChannelHandler { tx };
            client
                .chat(&messages, &config, &tools, &handler, &task_token)
                .await;
            if task_token.is_cancelled() {
                info!(model = %config.model, "ChatStream: operation cancelled");
            }
        });

        ChatStream { rx, cancel: token }
    }
}
