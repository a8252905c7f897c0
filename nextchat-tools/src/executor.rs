//! Running the tool calls of a round.
//!
//! [`ToolExecutor`] resolves completed [`ToolCall`]s against a
//! [`ToolRegistry`] and turns every outcome into a tool-result message.
//! A failing call does not abort the round: its error is reported to the
//! model in the result message instead. Only cancellation stops a round,
//! and results produced after cancellation are discarded.

use std::time::Duration;

use nextchat_core::{ChatMessage, ToolCall};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    errors::ToolError,
    registry::ToolRegistry,
    return_types::{ToolResult, ToolReturn},
};

/// Executes tool calls one after another, in the order they were started.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Option<Duration>,
}

impl ToolExecutor {
    /// Create an executor over the given registry.
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bound every single tool call by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The registry tools are resolved against.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a single call.
    ///
    /// Empty arguments are treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` when the arguments are not valid JSON,
    /// `NotFound` for an unknown tool, `Timeout` when the call overran, or
    /// the tool's own error.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let args = call
            .parse_arguments()
            .map_err(|e| ToolError::invalid_args(format!("{}: {e}", call.name())))?;

        let fut = self.registry.call(call.name(), args);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ToolError::timeout(limit))?,
            None => fut.await,
        }
    }

    /// Run every call and build one tool-result message per call.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Cancelled` if `cancel` fires before every call has
    /// resolved; partial results are dropped.
    pub async fn execute_all(
        &self,
        calls: &[ToolCall],
        cancel: &CancellationToken,
    ) -> Result<Vec<ChatMessage>, ToolError> {
        let mut messages = Vec::with_capacity(calls.len());

        for call in calls {
            if cancel.is_cancelled() {
                return Err(ToolError::Cancelled);
            }

            debug!(tool_name = call.name(), tool_call_id = %call.id, "Executing tool call");

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ToolError::Cancelled),
                result = self.execute(call) => result,
            };

            let content = match result {
                Ok(ret) => ret.to_message_content(),
                Err(e) => {
                    warn!(
                        tool_name = call.name(),
                        tool_call_id = %call.id,
                        error = %e,
                        "Tool execution failed"
                    );
                    ToolReturn::error(e.to_string()).to_message_content()
                }
            };

            messages.push(ChatMessage::tool(call.id.clone(), content));
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionTool;
    use nextchat_core::Role;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn schema() -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(FunctionTool::new("add", "Add", schema(), |args| async move {
            let a = args["a"].as_i64().unwrap_or(0);
            let b = args["b"].as_i64().unwrap_or(0);
            Ok(ToolReturn::json(serde_json::json!({ "sum": a + b })))
        }));
        registry.register(FunctionTool::new("args", "Echo args", schema(), |args| async move {
            Ok(ToolReturn::text(args.to_string()))
        }));
        registry
    }

    #[tokio::test]
    async fn test_results_in_call_order() {
        let executor = ToolExecutor::new(registry());
        let calls = vec![
            ToolCall::function("call_1", "add", r#"{"a":1,"b":2}"#),
            ToolCall::function("call_2", "args", ""),
        ];

        let messages = executor
            .execute_all(&calls, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::Tool);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(messages[0].text_content(), r#"{"sum":3}"#);
        assert_eq!(messages[1].text_content(), "{}");
    }

    #[tokio::test]
    async fn test_failures_become_error_results() {
        let executor = ToolExecutor::new(registry());
        let calls = vec![
            ToolCall::function("call_1", "missing", "{}"),
            ToolCall::function("call_2", "add", r#"{"a":"#),
        ];

        let messages = executor
            .execute_all(&calls, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert!(messages[0].text_content().contains("Tool not found: missing"));
        assert!(messages[1].text_content().contains("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_timeout_reported_as_result() {
        let mut registry = ToolRegistry::new();
        registry.register(FunctionTool::new("slow", "Slow", schema(), |_args| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ToolReturn::text("late"))
        }));
        let executor = ToolExecutor::new(registry).with_timeout(Duration::from_millis(10));

        let messages = executor
            .execute_all(
                &[ToolCall::function("call_1", "slow", "{}")],
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(messages[0].text_content().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = ToolExecutor::new(registry())
            .execute_all(&[ToolCall::function("call_1", "add", "{}")], &cancel)
            .await;
        assert!(matches!(result, Err(ToolError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_abandons_in_flight_call() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);

        let mut registry = ToolRegistry::new();
        registry.register(FunctionTool::new("wait", "Wait", schema(), move |_args| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ToolReturn::text("done"))
            }
        }));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = ToolExecutor::new(registry)
            .execute_all(&[ToolCall::function("call_1", "wait", "{}")], &cancel)
            .await;

        assert!(matches!(result, Err(ToolError::Cancelled)));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
