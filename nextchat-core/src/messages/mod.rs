//! Message types for chat conversations.
//!
//! - [`ChatMessage`] and [`Role`]: one entry in a conversation
//! - [`MessageContent`] and [`ContentPart`]: plain text or multimodal parts
//! - [`ToolCall`] and [`FunctionCall`]: materialized model-issued tool invocations
//!
//! ## Example
//!
//! ```rust
//! use nextchat_core::messages::{ChatMessage, ContentPart, MessageContent};
//!
//! let message = ChatMessage::user(MessageContent::Parts(vec![
//!     ContentPart::text("What is in this picture?"),
//!     ContentPart::image_url("https://example.com/cat.png"),
//! ]));
//! assert_eq!(message.text_content(), "What is in this picture?");
//! assert!(message.content.has_images());
//! ```

pub mod content;
pub mod message;
pub mod tool_call;

pub use content::{ContentPart, ImageUrl, MessageContent};
pub use message::{ChatMessage, Role};
pub use tool_call::{FunctionCall, ToolCall};
