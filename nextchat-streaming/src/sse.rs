//! Server-Sent Events (SSE) framing.
//!
//! [`SseParser`] turns arbitrary byte chunks into complete events, and
//! [`SseStream`] adapts an HTTP body stream into a stream of events. Chunk
//! boundaries may fall anywhere, including inside a multi-byte character.

use crate::error::{StreamError, StreamResult};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

const MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// Literal payload that ends a chat-completion stream.
pub const DONE_PAYLOAD: &str = "[DONE]";

/// A parsed SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type (if specified).
    pub event: Option<String>,
    /// Event data.
    pub data: String,
    /// Event ID (if specified).
    pub id: Option<String>,
    /// Retry timeout (if specified).
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Create a new SSE event with just data.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Set the event type.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Check if this is the `[DONE]` terminator.
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_PAYLOAD || self.event.as_deref() == Some("done")
    }

    /// Parse the data as JSON.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

/// Incremental parser for Server-Sent Events.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    utf8_tail: Vec<u8>,
    events: VecDeque<SseEvent>,
    last_event_id: Option<String>,
}

impl SseParser {
    /// Create a new SSE parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes into the parser.
    ///
    /// Incomplete UTF-8 sequences at the end of a chunk are held back until
    /// the next chunk completes them.
    pub fn feed(&mut self, bytes: &Bytes) -> StreamResult<Vec<SseEvent>> {
        self.utf8_tail.extend_from_slice(bytes);
        let decoded = match std::str::from_utf8(&self.utf8_tail) {
            Ok(text) => {
                let text = text.to_string();
                self.utf8_tail.clear();
                text
            }
            Err(err) if err.error_len().is_none() => {
                let valid = err.valid_up_to();
                let text = String::from_utf8_lossy(&self.utf8_tail[..valid]).into_owned();
                self.utf8_tail.drain(..valid);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.utf8_tail).into_owned();
                self.utf8_tail.clear();
                text
            }
        };
        self.feed_str(&decoded)
    }

    /// Feed a string into the parser.
    pub fn feed_str(&mut self, s: &str) -> StreamResult<Vec<SseEvent>> {
        self.buffer.push_str(s);

        if self.buffer.len() > MAX_BUFFER_SIZE {
            return Err(StreamError::BufferOverflow(MAX_BUFFER_SIZE));
        }

        Ok(self.parse_buffer())
    }

    /// Call when the byte stream ends to flush a trailing event without a blank line.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        if !self.utf8_tail.is_empty() {
            let tail = String::from_utf8_lossy(&self.utf8_tail).into_owned();
            self.utf8_tail.clear();
            self.buffer.push_str(&tail);
        }

        let mut events = self.parse_buffer();

        if !self.buffer.trim().is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            if let Some(event) = self.parse_event(rest.trim_end_matches(['\n', '\r'])) {
                self.record(event.clone());
                events.push(event);
            }
        }

        self.buffer.clear();
        events
    }

    /// Get the next parsed event.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        self.events.pop_front()
    }

    /// Check if there are pending events.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get the last event ID.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    fn record(&mut self, event: SseEvent) {
        if let Some(id) = &event.id {
            self.last_event_id = Some(id.clone());
        }
        self.events.push_back(event);
    }

    fn parse_buffer(&mut self) -> Vec<SseEvent> {
        let mut parsed_events = Vec::new();

        while let Some((pos, delimiter_len)) = self.find_event_boundary() {
            let event_str: String = self.buffer.drain(..pos + delimiter_len).collect();
            let event_str = &event_str[..pos];

            if let Some(event) = self.parse_event(event_str) {
                self.record(event.clone());
                parsed_events.push(event);
            }
        }

        parsed_events
    }

    fn find_event_boundary(&self) -> Option<(usize, usize)> {
        let newline = self.buffer.find("\n\n").map(|pos| (pos, 2));
        let carriage = self.buffer.find("\r\n\r\n").map(|pos| (pos, 4));

        match (newline, carriage) {
            (Some(nl), Some(cr)) => Some(if cr.0 < nl.0 { cr } else { nl }),
            (Some(nl), None) => Some(nl),
            (None, Some(cr)) => Some(cr),
            (None, None) => None,
        }
    }

    fn parse_event(&self, s: &str) -> Option<SseEvent> {
        let mut event = None;
        let mut data_lines = Vec::new();
        let mut id = None;
        let mut retry = None;

        for line in s.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            if let Some(value) = line.strip_prefix("event:") {
                event = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                data_lines.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            } else if let Some(value) = line.strip_prefix("id:") {
                id = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("retry:") {
                retry = value.trim().parse().ok();
            } else if line == "data" {
                data_lines.push(String::new());
            }
        }

        if data_lines.is_empty() {
            return None;
        }

        Some(SseEvent {
            event,
            data: data_lines.join("\n"),
            id,
            retry,
        })
    }
}

pin_project! {
    /// Stream adapter that parses SSE from a byte stream.
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        parser: SseParser,
        finished: bool,
    }
}

impl<S> SseStream<S>
where
    S: Stream<Item = Result<Bytes, std::io::Error>>,
{
    /// Create a new SSE stream from a byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: SseParser::new(),
            finished: false,
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
{
    type Item = StreamResult<SseEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.parser.next_event() {
                return Poll::Ready(Some(Ok(event)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Err(error) = this.parser.feed(&bytes) {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(error)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(StreamError::Io(e))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    this.parser.finish();
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
