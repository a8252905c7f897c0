//! # nextchat-tools
//!
//! Tool system for nextchat.
//!
//! This crate provides the pieces needed to let a model call functions
//! during a chat:
//!
//! - **[`Tool`]**: Trait for callable tools
//! - **[`ToolRegistry`]**: Tools by name, in registration order
//! - **[`PluginStore`]**: Named tool bundles; [`PluginStore::as_tools`] merges a selection
//! - **[`ToolExecutor`]**: Runs a round's tool calls and builds the tool-result messages
//!
//! ## Example
//!
//! ```rust
//! use nextchat_core::ToolCall;
//! use nextchat_tools::{FunctionTool, ToolExecutor, ToolRegistry, ToolReturn};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let mut registry = ToolRegistry::new();
//! registry.register(FunctionTool::new(
//!     "get_weather",
//!     "Get current weather for a location",
//!     serde_json::json!({
//!         "type": "object",
//!         "properties": {"location": {"type": "string"}},
//!         "required": ["location"]
//!     }),
//!     |args| async move {
//!         let location = args["location"].as_str().unwrap_or("Unknown").to_string();
//!         Ok(ToolReturn::text(format!("Weather in {location}: 22C, sunny")))
//!     },
//! ));
//!
//! let calls = [ToolCall::function("call_1", "get_weather", r#"{"location":"Paris"}"#)];
//! let results = ToolExecutor::new(registry)
//!     .execute_all(&calls, &CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert_eq!(results[0].text_content(), "Weather in Paris: 22C, sunny");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod definition;
pub mod errors;
pub mod executor;
pub mod plugin;
pub mod registry;
pub mod return_types;
pub mod tool;

// Re-export core types
pub use definition::ToolDefinition;
pub use errors::ToolError;
pub use executor::ToolExecutor;
pub use plugin::{Plugin, PluginStore};
pub use registry::ToolRegistry;
pub use return_types::{ToolResult, ToolReturn};
pub use tool::{BoxedTool, FunctionTool, Tool};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        FunctionTool, Plugin, PluginStore, Tool, ToolDefinition, ToolError, ToolExecutor,
        ToolRegistry, ToolResult, ToolReturn,
    };
}
