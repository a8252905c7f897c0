//! Tool registry for managing multiple tools.
//!
//! Tools are kept in registration order so the `tools` array sent to the
//! model is the same from one request to the next.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::{definition::ToolDefinition, errors::ToolError, return_types::ToolReturn, tool::Tool};

/// Registry of tools the model may call.
///
/// # Example
///
/// ```
/// use nextchat_tools::{FunctionTool, ToolRegistry, ToolReturn};
///
/// let mut registry = ToolRegistry::new();
/// registry.register(FunctionTool::new(
///     "now",
///     "Current time",
///     serde_json::json!({"type": "object", "properties": {}}),
///     |_args| async { Ok(ToolReturn::text("12:00")) },
/// ));
///
/// assert!(registry.contains("now"));
/// assert_eq!(registry.definitions().len(), 1);
/// ```
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool, replacing any existing tool with the same name.
    ///
    /// A replaced tool keeps its original position.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.register_boxed(Arc::new(tool))
    }

    /// Register a shared tool.
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.name();
        self.tools.insert(name, tool);
        self
    }

    /// Register a tool if not already present.
    ///
    /// Returns `true` if the tool was registered, `false` if it already existed.
    pub fn register_if_absent<T: Tool + 'static>(&mut self, tool: T) -> bool {
        let name = tool.name();
        if self.tools.contains_key(&name) {
            false
        } else {
            self.tools.insert(name, Arc::new(tool));
            true
        }
    }

    /// Unregister a tool by name.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.shift_remove(name)
    }

    /// Get all tool definitions, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Call a tool by name.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::NotFound` if no tool with the given name exists,
    /// or whatever error the tool itself reports.
    pub async fn call(&self, name: &str, args: serde_json::Value) -> Result<ToolReturn, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        tool.call(args).await
    }

    /// Check if a tool exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Get all tool names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Merge another registry into this one.
    ///
    /// Tools from `other` replace tools with the same name in `self`.
    pub fn merge(&mut self, other: &ToolRegistry) {
        for (name, tool) in &other.tools {
            self.tools.insert(name.clone(), Arc::clone(tool));
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl Clone for ToolRegistry {
    fn clone(&self) -> Self {
        Self {
            tools: self.tools.clone(),
        }
    }
}
