//! Event-stream transport.
//!
//! [`open_event_stream`] sends a request and inspects the response before
//! any frame is read. A successful `text/event-stream` response becomes an
//! [`EventStream`]. Anything else is turned into diagnostic text the caller
//! shows as the answer instead of failing: a plain-text body is passed
//! through, an error body is pretty-printed, and a 401 gets an
//! [`UNAUTHORIZED_NOTICE`] in front.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use mime::Mime;
use nextchat_streaming::SseStream;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ModelError, ModelResult};

/// Marker placed in front of the diagnostic of a 401 response.
pub const UNAUTHORIZED_NOTICE: &str =
    "Unauthorized: the access code or API key was rejected. Check the endpoint settings.";

/// Parsed SSE frames of an open response.
pub type EventStream = SseStream<BoxStream<'static, Result<Bytes, std::io::Error>>>;

/// What opening an event stream produced.
pub enum StreamOpen {
    /// The server is streaming events.
    Events(EventStream),
    /// The server answered with something else; show this text instead.
    Degraded(Diagnostic),
}

impl std::fmt::Debug for StreamOpen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Events(_) => f.write_str("Events(..)"),
            Self::Degraded(d) => f.debug_tuple("Degraded").field(d).finish(),
        }
    }
}

/// Displayable explanation of a response that was not an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// HTTP status of the response.
    pub status: u16,
    /// Text to present as the answer.
    pub text: String,
}

/// Send `request` and open its response as an event stream.
///
/// # Errors
///
/// Returns `ModelError::Cancelled` if `cancel` fires first, a network error
/// if the request cannot be sent, or an HTTP error for a failed response
/// that carries nothing displayable.
pub async fn open_event_stream(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> ModelResult<StreamOpen> {
    let request = request.header(ACCEPT, mime::TEXT_EVENT_STREAM.as_ref());

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ModelError::Cancelled),
        response = request.send() => response?,
    };

    let status = response.status();
    let content_type = content_type(&response);
    debug!(
        status = status.as_u16(),
        content_type = content_type.as_ref().map(Mime::essence_str),
        "Event stream response"
    );

    let essence = content_type.as_ref().map(Mime::essence_str);
    let is_event_stream = essence == Some(mime::TEXT_EVENT_STREAM.essence_str());
    let is_plain_text = essence == Some(mime::TEXT_PLAIN.essence_str());

    if status.is_success() && is_event_stream {
        let bytes = response.bytes_stream().map_err(std::io::Error::other).boxed();
        return Ok(StreamOpen::Events(SseStream::new(bytes)));
    }

    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ModelError::Cancelled),
        body = response.text() => body?,
    };

    if status.is_success() && is_plain_text {
        return Ok(StreamOpen::Degraded(Diagnostic {
            status: status.as_u16(),
            text: body,
        }));
    }

    let text = diagnostic_text(status, &body);
    if text.is_empty() {
        return Err(ModelError::http(status.as_u16(), body));
    }
    Ok(StreamOpen::Degraded(Diagnostic {
        status: status.as_u16(),
        text,
    }))
}

/// Build the text shown for a response that was not an event stream.
#[must_use]
pub fn diagnostic_text(status: StatusCode, body: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if status == StatusCode::UNAUTHORIZED {
        parts.push(UNAUTHORIZED_NOTICE.to_string());
    }

    let body = body.trim();
    if !body.is_empty() {
        match serde_json::from_str::<JsonValue>(body) {
            Ok(value) => parts.push(fenced_json(&value, "json")),
            Err(_) => parts.push(body.to_string()),
        }
    }

    parts.join("\n\n")
}

/// Pretty-print `value` inside a Markdown code fence.
pub(crate) fn fenced_json(value: &JsonValue, lang: &str) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("```{lang}\n{pretty}\n```")
}

fn content_type(response: &Response) -> Option<Mime> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
