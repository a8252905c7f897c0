//! # nextchat-models
//!
//! Transport to OpenAI-compatible chat-completion services.
//!
//! - **Endpoints**: [`EndpointConfig`] resolves URLs and auth headers for
//!   OpenAI, Azure OpenAI and UniSee
//! - **Capabilities**: [`ModelCapabilities`] decides what a request may carry
//! - **Payloads**: [`build_payload`] projects a conversation into a request
//! - **Transport**: [`ChatGptApi`] opens event streams or completes
//!   non-streaming requests; non-stream responses degrade into displayable
//!   [`Diagnostic`] text
//!
//! ## Example
//!
//! ```rust,no_run
//! use nextchat_core::{ChatMessage, ModelConfig};
//! use nextchat_models::{build_payload, ChatGptApi, EndpointConfig, ModelCapabilities, StreamOpen};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> nextchat_models::ModelResult<()> {
//! let api = ChatGptApi::new(EndpointConfig::openai("sk-..."))?;
//! let config = ModelConfig::new("gpt-4o-mini");
//! let caps = ModelCapabilities::for_model(&config.model);
//! let payload = build_payload(&[ChatMessage::user("Hello!")], &config, &caps, &[]);
//!
//! match api.open_stream(&payload, &CancellationToken::new()).await? {
//!     StreamOpen::Events(_events) => { /* feed frames to the delta parser */ }
//!     StreamOpen::Degraded(diag) => println!("{}", diag.text),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod openai;
pub mod profile;
pub mod transport;
pub mod upload;

pub use config::{EndpointConfig, EndpointKind, ServiceProvider, CHAT_PATH, IMAGE_PATH, OPENAI_BASE_URL};
pub use error::{ModelError, ModelResult};
pub use openai::{build_payload, ChatGptApi, RequestPayload};
pub use profile::ModelCapabilities;
pub use transport::{open_event_stream, Diagnostic, EventStream, StreamOpen, UNAUTHORIZED_NOTICE};
pub use upload::{DataUrlUploader, ImageUploader};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::config::{EndpointConfig, ServiceProvider};
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::openai::{build_payload, ChatGptApi, RequestPayload};
    pub use crate::profile::ModelCapabilities;
    pub use crate::transport::{Diagnostic, StreamOpen};
}
