//! Core tool trait and implementations.
//!
//! This module provides the `Tool` trait which all tools must implement,
//! as well as the `FunctionTool` wrapper for closure-based tools.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::sync::Arc;

use crate::{definition::ToolDefinition, return_types::ToolResult};

/// Core trait for all tools.
///
/// Tools receive their arguments as the parsed JSON object the model sent.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use nextchat_tools::{Tool, ToolDefinition, ToolResult, ToolReturn};
///
/// struct GreetTool;
///
/// #[async_trait]
/// impl Tool for GreetTool {
///     fn definition(&self) -> ToolDefinition {
///         ToolDefinition::new("greet", "Greet someone")
///     }
///
///     async fn call(&self, args: serde_json::Value) -> ToolResult {
///         let name = args["name"].as_str().unwrap_or("World");
///         Ok(ToolReturn::text(format!("Hello, {name}!")))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn call(&self, args: JsonValue) -> ToolResult;

    /// Get the tool name.
    fn name(&self) -> String {
        self.definition().name
    }
}

/// Type-erased shared tool.
pub type BoxedTool = Arc<dyn Tool>;

/// Wrapper for closure-based async tools.
///
/// # Example
///
/// ```
/// use nextchat_tools::{FunctionTool, ToolReturn};
///
/// let tool = FunctionTool::new(
///     "add",
///     "Add two numbers",
///     serde_json::json!({
///         "type": "object",
///         "properties": {"a": {"type": "number"}, "b": {"type": "number"}}
///     }),
///     |args| async move {
///         let a = args["a"].as_f64().unwrap_or(0.0);
///         let b = args["b"].as_f64().unwrap_or(0.0);
///         Ok(ToolReturn::text(format!("{}", a + b)))
///     },
/// );
/// ```
pub struct FunctionTool<F> {
    name: String,
    description: String,
    parameters: JsonValue,
    function: F,
    strict: Option<bool>,
}

impl<F> FunctionTool<F> {
    /// Create a new function tool.
    pub fn new<Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: impl Into<JsonValue>,
        function: F,
    ) -> Self
    where
        F: Fn(JsonValue) -> Fut + Send + Sync,
        Fut: Future<Output = ToolResult> + Send,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.into(),
            function,
            strict: None,
        }
    }

    /// Set strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }
}

#[async_trait]
impl<F, Fut> Tool for FunctionTool<F>
where
    F: Fn(JsonValue) -> Fut + Send + Sync,
    Fut: Future<Output = ToolResult> + Send,
{
    fn definition(&self) -> ToolDefinition {
        let mut def = ToolDefinition::new(&self.name, &self.description)
            .with_parameters(self.parameters.clone());
        if let Some(strict) = self.strict {
            def = def.with_strict(strict);
        }
        def
    }

    async fn call(&self, args: JsonValue) -> ToolResult {
        (self.function)(args).await
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl<F> std::fmt::Debug for FunctionTool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
