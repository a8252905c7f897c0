//! Chat-completion delta parsing.
//!
//! Each SSE frame of a chat-completion stream carries a JSON chunk shaped
//! like `{"choices":[{"delta":{"content":"..","tool_calls":[..]}}]}`.
//! [`parse_delta`] classifies one frame payload without ever failing: a
//! frame that cannot be decoded is reported as [`Delta::Unparseable`] and
//! the caller moves on to the next one.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sse::DONE_PAYLOAD;

/// One streamed chunk of a chat completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionChunk {
    /// Chunk ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Model name echoed by the provider.
    #[serde(default)]
    pub model: Option<String>,
    /// Choices; only the first one is consumed.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// Choice inside a chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    /// Choice index.
    #[serde(default)]
    pub index: u32,
    /// Incremental delta.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Finish reason, present on the last chunk of a choice.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The delta object of a choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// Role (usually only in first chunk).
    #[serde(default)]
    pub role: Option<String>,
    /// Text content delta.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool call fragments.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallFragment>>,
}

/// A piece of a streamed tool call.
///
/// Only the first fragment of a call carries `id`; later fragments share the
/// same `index` and carry more argument text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallFragment {
    /// Position among the concurrent tool calls of this turn.
    #[serde(default)]
    pub index: u32,
    /// Call ID, present only on the first fragment of a call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    /// Function name and argument text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FragmentFunction>,
}

impl ToolCallFragment {
    /// First fragment of a new call.
    pub fn start(
        index: u32,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            index,
            id: Some(id.into()),
            call_type: Some("function".to_string()),
            function: Some(FragmentFunction {
                name: Some(name.into()),
                arguments: Some(arguments.into()),
            }),
        }
    }

    /// Continuation fragment carrying more argument text.
    pub fn continuation(index: u32, arguments: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            call_type: None,
            function: Some(FragmentFunction {
                name: None,
                arguments: Some(arguments.into()),
            }),
        }
    }

    /// Whether this fragment starts a new call.
    pub fn starts_call(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Function name carried by this fragment, if any.
    pub fn name(&self) -> Option<&str> {
        self.function
            .as_ref()
            .and_then(|f| f.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Argument text carried by this fragment (empty when absent).
    pub fn arguments(&self) -> &str {
        self.function
            .as_ref()
            .and_then(|f| f.arguments.as_deref())
            .unwrap_or_default()
    }
}

/// Function portion of a tool-call fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentFunction {
    /// Function name (only in first fragment).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments text to append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Classification of one frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// A text increment.
    Text(String),
    /// One or more tool-call fragments.
    ToolCalls(Vec<ToolCallFragment>),
    /// Nothing to apply (keep-alive, role-only chunk, empty content).
    Empty,
    /// The `[DONE]` terminator.
    Done,
    /// The payload could not be decoded; carries the decode error.
    Unparseable(String),
}

impl Delta {
    /// Whether this delta ends the stream.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Classify one raw SSE data payload.
///
/// Tool-call fragments on the first choice take precedence over its text.
pub fn parse_delta(payload: &str) -> Delta {
    let payload = payload.trim();
    if payload == DONE_PAYLOAD {
        return Delta::Done;
    }
    if payload.is_empty() {
        return Delta::Empty;
    }

    let chunk: ChatCompletionChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(error = %e, payload, "Skipping unparseable stream frame");
            return Delta::Unparseable(e.to_string());
        }
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Delta::Empty;
    };

    match choice.delta.tool_calls {
        Some(fragments) if !fragments.is_empty() => Delta::ToolCalls(fragments),
        _ => match choice.delta.content {
            Some(content) if !content.is_empty() => Delta::Text(content),
            _ => Delta::Empty,
        },
    }
}
