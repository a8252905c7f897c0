//! Tool definitions sent to the model.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Complete tool definition sent to the model.
///
/// Contains what a model needs to call a tool: its name, a description,
/// and the JSON Schema of its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Tool name (must be a valid identifier).
    pub name: String,

    /// Human-readable description of what the tool does.
    pub description: String,

    /// JSON Schema for the tool's parameters.
    pub parameters: JsonValue,

    /// Whether to use strict mode for schema validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ToolDefinition {
    /// Create a tool definition that takes no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: empty_object_schema(),
            strict: None,
        }
    }

    /// Set the parameters schema.
    #[must_use]
    pub fn with_parameters(mut self, schema: impl Into<JsonValue>) -> Self {
        self.parameters = schema.into();
        self
    }

    /// Set strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Get the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parameters schema.
    #[must_use]
    pub fn parameters(&self) -> &JsonValue {
        &self.parameters
    }

    /// Convert to the chat-completions `tools` entry.
    #[must_use]
    pub fn to_openai_function(&self) -> JsonValue {
        let mut func = serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters.clone()
            }
        });

        if let Some(strict) = self.strict {
            func["function"]["strict"] = JsonValue::Bool(strict);
        }

        func
    }
}

fn empty_object_schema() -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}
