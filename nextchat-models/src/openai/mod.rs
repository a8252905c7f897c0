//! OpenAI-compatible chat completions.
//!
//! - [`ChatGptApi`]: sends requests and extracts answers
//! - [`build_payload`]: projects a conversation into a request body
//! - [`types`]: wire types for the request bodies

pub mod chat;
pub mod payload;
pub mod types;

pub use chat::ChatGptApi;
pub use payload::{build_chat_request, build_image_request, build_payload, VISION_MIN_MAX_TOKENS};
pub use types::{ChatCompletionRequest, ImageGenerationRequest, RequestMessage, RequestPayload};
