//! Materialized tool calls.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A complete, model-issued tool invocation.
///
/// `function.arguments` is the concatenation of every streamed argument
/// fragment and is expected to parse as JSON once the stream has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in the tool result.
    pub id: String,
    /// Call type; currently always `function`.
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function being invoked.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function tool call.
    #[must_use]
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// The function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Arguments as sent to the tool: an empty string counts as `{}`.
    #[must_use]
    pub fn effective_arguments(&self) -> &str {
        if self.function.arguments.trim().is_empty() {
            "{}"
        } else {
            &self.function.arguments
        }
    }

    /// Parse the arguments as JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the concatenated fragments are not valid JSON.
    pub fn parse_arguments(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(self.effective_arguments())
    }
}

/// Function name and raw JSON arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}
