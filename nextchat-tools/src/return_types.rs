//! Tool return types.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// What a tool returns after execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolReturn {
    /// Plain text, sent to the model as-is.
    Text(String),
    /// Structured result, sent to the model as serialized JSON.
    Json(JsonValue),
    /// A failure the model should see and react to.
    Error(String),
}

impl ToolReturn {
    /// Create a text return.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a JSON return.
    #[must_use]
    pub fn json(value: JsonValue) -> Self {
        Self::Json(value)
    }

    /// Create a JSON return from a serializable value.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Create an error return.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Check if this is an error return.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Get the content as text if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Content of the tool-result message sent back to the model.
    #[must_use]
    pub fn to_message_content(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Json(value) => value.to_string(),
            Self::Error(msg) => serde_json::json!({ "error": msg }).to_string(),
        }
    }
}

impl From<String> for ToolReturn {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<&str> for ToolReturn {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<JsonValue> for ToolReturn {
    fn from(v: JsonValue) -> Self {
        Self::json(v)
    }
}

/// Result of a tool execution.
pub type ToolResult = Result<ToolReturn, crate::ToolError>;
