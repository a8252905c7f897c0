//! Chat-completions wire types.

use nextchat_core::{ImageQuality, ImageStyle, MessageContent, Role, ToolCall};
use serde::Serialize;
use serde_json::Value as JsonValue;

// ============================================================================
// Request Types
// ============================================================================

/// Chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use.
    pub model: String,
    /// Messages in the conversation.
    pub messages: Vec<RequestMessage>,
    /// Whether to stream the response.
    pub stream: bool,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling parameter.
    pub top_p: f64,
    /// Presence penalty.
    pub presence_penalty: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Maximum tokens to generate; only sent for vision models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Tool definitions, in `{"type":"function","function":{..}}` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<JsonValue>>,
}

/// A conversation message as sent to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMessage {
    /// Role.
    pub role: Role,
    /// Text or multimodal parts.
    pub content: MessageContent,
    /// Tool calls issued by an assistant message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Call answered by a tool message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Image generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageGenerationRequest {
    /// Model to use.
    pub model: String,
    /// Prompt, taken from the last message.
    pub prompt: String,
    /// Always `b64_json`.
    pub response_format: String,
    /// Number of images.
    pub n: u32,
    /// Image size, e.g. `1024x1024`.
    pub size: String,
    /// Image quality.
    pub quality: ImageQuality,
    /// Image style.
    pub style: ImageStyle,
}

/// Body of a request, whichever endpoint it targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    /// Chat completion.
    Chat(ChatCompletionRequest),
    /// Image generation.
    Image(ImageGenerationRequest),
}

impl RequestPayload {
    /// Whether the response will be an event stream.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Chat(req) if req.stream)
    }

    /// Model name.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::Chat(req) => &req.model,
            Self::Image(req) => &req.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_skipped() {
        let req = ChatCompletionRequest {
            model: "gpt-4".into(),
            messages: vec![RequestMessage {
                role: Role::User,
                content: MessageContent::text("hi"),
                tool_calls: None,
                tool_call_id: None,
            }],
            stream: true,
            temperature: 0.5,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: None,
            tools: None,
        };

        let json = serde_json::to_value(RequestPayload::Chat(req)).unwrap();
        assert_eq!(json["messages"][0], serde_json::json!({"role": "user", "content": "hi"}));
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_image_request_shape() {
        let req = ImageGenerationRequest {
            model: "dall-e-3".into(),
            prompt: "a cat".into(),
            response_format: "b64_json".into(),
            n: 1,
            size: "1024x1024".into(),
            quality: ImageQuality::Hd,
            style: ImageStyle::Natural,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["quality"], "hd");
        assert_eq!(json["style"], "natural");
        assert_eq!(json["n"], 1);
    }
}
