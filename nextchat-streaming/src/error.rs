//! Streaming errors.

use thiserror::Error;

/// Errors that can occur while reading an event stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Parse error for SSE event.
    #[error("Failed to parse SSE event: {0}")]
    ParseSse(String),

    /// An event grew past the parser's buffer limit.
    #[error("SSE buffer exceeded {0} bytes without an event boundary")]
    BufferOverflow(usize),

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error from the underlying byte stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream was interrupted.
    #[error("Stream interrupted")]
    Interrupted,

    /// Timeout waiting for next frame.
    #[error("Timeout waiting for frame")]
    Timeout,
}

impl StreamError {
    /// Check if the error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Interrupted)
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
