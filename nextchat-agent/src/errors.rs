//! Chat operation error types.
//!
//! Errors local to one frame or one tool call never reach this type; they
//! are absorbed where they happen. A [`ChatError`] is what the handler's
//! `on_error` receives when the whole operation has to stop.

use std::time::Duration;

use nextchat_core::SettingsError;
use nextchat_models::ModelError;
use nextchat_streaming::StreamError;
use nextchat_tools::ToolError;
use thiserror::Error;

/// Errors that end a chat operation.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport or vendor error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Tool execution could not complete.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// The event stream broke mid-response.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// Invalid configuration, detected before any request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No activity within the allowed time.
    #[error("Chat timed out after {0:?}")]
    Timeout(Duration),

    /// The model kept requesting tools past the round limit.
    #[error("Exceeded {rounds} tool rounds")]
    MaxRoundsExceeded {
        /// Rounds completed.
        rounds: u32,
    },
}

impl ChatError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Model(e) => e.is_retryable(),
            Self::Tool(e) => e.is_retryable(),
            Self::Stream(e) => e.is_recoverable(),
            Self::Timeout(_) => true,
            Self::Configuration(_) | Self::MaxRoundsExceeded { .. } => false,
        }
    }

    /// Whether this error was raised before any network activity.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Model(e) => e.is_configuration(),
            _ => false,
        }
    }
}

impl From<SettingsError> for ChatError {
    fn from(err: SettingsError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
