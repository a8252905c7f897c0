//! Chat orchestration for nextchat.
//!
//! One call to [`ChatClient::chat`] is one logical chat operation, however
//! many HTTP rounds it takes underneath:
//!
//! - [`StreamSession`] holds the text, tool calls and pacing state of the operation
//! - [`ContinuationController`] decides between finishing and another tool round
//! - [`ChatHandler`] receives updates and exactly one settling callback
//! - [`ChatClient::chat_stream`] exposes the same operation as a [`ChatStream`]
//!
//! # Example
//!
//! ```rust,no_run
//! use nextchat_agent::{ChatClient, ChatError, ChatHandler, ChatOutcome};
//! use nextchat_core::{ChatMessage, ModelConfig};
//! use nextchat_models::{ChatGptApi, EndpointConfig};
//! use nextchat_tools::ToolRegistry;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Print;
//!
//! impl ChatHandler for Print {
//!     fn on_update(&self, _text: &str, delta: &str) {
//!         print!("{delta}");
//!     }
//!     fn on_finish(&self, outcome: ChatOutcome) {
//!         println!("\n[{} rounds]", outcome.rounds);
//!     }
//!     fn on_error(&self, error: ChatError) {
//!         eprintln!("error: {error}");
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::new(ChatGptApi::new(EndpointConfig::openai("sk-..."))?);
//! client
//!     .chat(
//!         &[ChatMessage::user("Hello!")],
//!         &ModelConfig::new("gpt-4o-mini"),
//!         &ToolRegistry::new(),
//!         &Print,
//!         &CancellationToken::new(),
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chat;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handler;
pub mod session;
pub mod stream;

pub use chat::ChatClient;
pub use config::ChatOptions;
pub use controller::{Continuation, ContinuationController};
pub use errors::{ChatError, ChatResult};
pub use handler::{ChatHandler, ChatOutcome, FinishGuard};
pub use session::{SessionState, StreamSession};
pub use stream::{ChatEvent, ChatStream};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ChatClient, ChatError, ChatEvent, ChatHandler, ChatOptions, ChatOutcome, ChatStream,
    };
}
