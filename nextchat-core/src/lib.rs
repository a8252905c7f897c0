//! # nextchat-core
//!
//! Core types shared by every nextchat crate.
//!
//! - **Messages**: [`ChatMessage`], [`Role`] and multimodal [`MessageContent`]
//! - **Tool calls**: materialized [`ToolCall`] values as they are sent back to a vendor
//! - **Settings**: [`ModelConfig`] sampling and image-generation options
//! - **Identifiers**: message and session id helpers
//!
//! ## Example
//!
//! ```rust
//! use nextchat_core::{ChatMessage, ModelConfig, Role};
//!
//! let history = vec![
//!     ChatMessage::system("You are a helpful assistant."),
//!     ChatMessage::user("Hello!"),
//! ];
//! assert_eq!(history[1].role, Role::User);
//!
//! let config = ModelConfig::new("gpt-4o-mini").with_temperature(0.7);
//! assert!(config.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod identifier;
pub mod messages;
pub mod settings;

pub use identifier::{generate_message_id, generate_session_id, now_utc};
pub use messages::{
    ChatMessage, ContentPart, FunctionCall, ImageUrl, MessageContent, Role, ToolCall,
};
pub use settings::{ImageQuality, ImageStyle, ModelConfig, SettingsError};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::identifier::{generate_message_id, generate_session_id, now_utc};
    pub use crate::messages::{
        ChatMessage, ContentPart, FunctionCall, ImageUrl, MessageContent, Role, ToolCall,
    };
    pub use crate::settings::{ModelConfig, SettingsError};
}
