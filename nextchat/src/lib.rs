//! # nextchat
//!
//! Streaming chat completions against OpenAI-compatible services, with
//! tool-call continuation and paced text delivery.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nextchat::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ChatGptApi::new(EndpointConfig::from_env(ServiceProvider::OpenAI)?)?;
//!     let client = ChatClient::new(api);
//!
//!     let mut events = client.chat_stream(
//!         vec![ChatMessage::user("Tell me a short story.")],
//!         ModelConfig::new("gpt-4o-mini"),
//!         ToolRegistry::new(),
//!         &CancellationToken::new(),
//!     );
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             ChatEvent::Update { delta, .. } => print!("{delta}"),
//!             ChatEvent::Finished(outcome) => println!("\n[{} rounds]", outcome.rounds),
//!             ChatEvent::Failed(error) => eprintln!("\nerror: {error}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! nextchat is organized as a workspace of focused crates:
//!
//! - [`nextchat_core`] - Messages, tool calls and model settings
//! - [`nextchat_streaming`] - SSE framing, delta parsing, tool-call reassembly, pacing
//! - [`nextchat_tools`] - Tool trait, registry, plugins and execution
//! - [`nextchat_models`] - Endpoints, capabilities, payloads and transport
//! - [`nextchat_agent`] - The chat orchestrator

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod direct;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Messages, tool calls and model settings.
pub use nextchat_core as core;

/// Chat orchestration.
pub use nextchat_agent as agent;

/// Endpoints and transport.
pub use nextchat_models as models;

/// Streaming building blocks.
pub use nextchat_streaming as streaming;

/// Tool system.
pub use nextchat_tools as tools;

/// Cancellation token passed to every chat operation.
pub use tokio_util::sync::CancellationToken;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use nextchat_agent::{
    ChatClient, ChatError, ChatEvent, ChatHandler, ChatOptions, ChatOutcome, ChatStream,
    SessionState,
};
pub use nextchat_core::{
    ChatMessage, ContentPart, ImageQuality, ImageStyle, MessageContent, ModelConfig, Role,
    ToolCall,
};
pub use nextchat_models::{
    ChatGptApi, EndpointConfig, ImageUploader, ModelCapabilities, ModelError, ServiceProvider,
    UNAUTHORIZED_NOTICE,
};
pub use nextchat_streaming::{Delta, ResponseAnimator, ToolCallAccumulator};
pub use nextchat_tools::{
    FunctionTool, Plugin, PluginStore, Tool, ToolDefinition, ToolError, ToolRegistry,
    ToolResult, ToolReturn,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::direct::{chat_request, DirectError};
    pub use crate::{
        CancellationToken, ChatClient, ChatError, ChatEvent, ChatGptApi, ChatHandler,
        ChatMessage, ChatOptions, ChatOutcome, EndpointConfig, FunctionTool, MessageContent,
        ModelConfig, PluginStore, ServiceProvider, Tool, ToolDefinition, ToolRegistry,
        ToolReturn,
    };
}
