//! # nextchat-streaming
//!
//! Streaming building blocks for nextchat.
//!
//! This crate turns the raw bytes of a chat-completion event stream into
//! something a UI can consume:
//!
//! - **[`SseParser`] / [`SseStream`]**: frame Server-Sent Events out of arbitrary byte chunks
//! - **[`parse_delta`]**: classify one frame as text, tool-call fragments, keep-alive or `[DONE]`
//! - **[`ToolCallAccumulator`]**: reassemble tool calls from interleaved fragments
//! - **[`ResponseAnimator`]**: release buffered text at a bounded per-frame pace
//!
//! ## Example
//!
//! ```
//! use nextchat_streaming::{parse_delta, Delta, SseParser, ToolCallAccumulator};
//!
//! let mut parser = SseParser::new();
//! let mut tools = ToolCallAccumulator::new();
//! let mut text = String::new();
//!
//! let events = parser
//!     .feed_str("data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n")
//!     .unwrap();
//!
//! for event in events {
//!     match parse_delta(&event.data) {
//!         Delta::Text(t) => text.push_str(&t),
//!         Delta::ToolCalls(fragments) => tools.apply_all(&fragments),
//!         Delta::Done => break,
//!         Delta::Empty | Delta::Unparseable(_) => {}
//!     }
//! }
//! assert_eq!(text, "Hi");
//! assert!(tools.is_empty());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod animator;
pub mod delta;
pub mod error;
pub mod sse;

// Re-exports
pub use accumulator::{FragmentOutcome, ToolCallAccumulator};
pub use animator::{AnimationFrame, ResponseAnimator};
pub use delta::{
    parse_delta, ChatCompletionChunk, ChunkChoice, ChunkDelta, Delta, FragmentFunction,
    ToolCallFragment,
};
pub use error::{StreamError, StreamResult};
pub use sse::{SseEvent, SseParser, SseStream, DONE_PAYLOAD};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        parse_delta, Delta, ResponseAnimator, SseEvent, SseParser, SseStream, StreamError,
        StreamResult, ToolCallAccumulator, ToolCallFragment,
    };
}
