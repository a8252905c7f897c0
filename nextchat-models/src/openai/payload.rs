//! Request payload construction.
//!
//! A payload is a projection of the conversation for one round. It is
//! rebuilt from scratch for every round, after tool results have been
//! appended, so nothing here keeps state between requests.

use nextchat_core::{ChatMessage, MessageContent, ModelConfig, Role};
use nextchat_tools::ToolDefinition;
use tracing::debug;

use super::types::{ChatCompletionRequest, ImageGenerationRequest, RequestMessage, RequestPayload};
use crate::profile::ModelCapabilities;

/// Minimum `max_tokens` sent to vision models.
pub const VISION_MIN_MAX_TOKENS: u64 = 4000;

/// Build the payload for one round.
///
/// Image models get an image-generation request; everything else a chat
/// completion request shaped by `caps`.
#[must_use]
pub fn build_payload(
    messages: &[ChatMessage],
    config: &ModelConfig,
    caps: &ModelCapabilities,
    tools: &[ToolDefinition],
) -> RequestPayload {
    if caps.image_generation {
        RequestPayload::Image(build_image_request(messages, config))
    } else {
        RequestPayload::Chat(build_chat_request(messages, config, caps, tools))
    }
}

/// Build a chat completion request.
#[must_use]
pub fn build_chat_request(
    messages: &[ChatMessage],
    config: &ModelConfig,
    caps: &ModelCapabilities,
    tools: &[ToolDefinition],
) -> ChatCompletionRequest {
    let messages: Vec<RequestMessage> = messages
        .iter()
        .filter(|m| caps.supports_system_role || m.role != Role::System)
        .map(|m| RequestMessage {
            role: m.role,
            content: if caps.supports_vision {
                m.content.clone()
            } else {
                MessageContent::text(m.text_content())
            },
            tool_calls: m.tool_calls.clone().filter(|calls| !calls.is_empty()),
            tool_call_id: m.tool_call_id.clone(),
        })
        .collect();

    let stream = caps.should_stream(config.stream);

    let (temperature, top_p, presence_penalty, frequency_penalty) = if caps.supports_temperature {
        (
            config.temperature,
            config.top_p,
            config.presence_penalty,
            config.frequency_penalty,
        )
    } else {
        (1.0, 1.0, 0.0, 0.0)
    };

    let max_tokens = caps
        .supports_vision
        .then(|| config.max_tokens.max(VISION_MIN_MAX_TOKENS));

    let tools = (stream && caps.supports_tools && !tools.is_empty())
        .then(|| tools.iter().map(ToolDefinition::to_openai_function).collect());

    let request = ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        stream,
        temperature,
        top_p,
        presence_penalty,
        frequency_penalty,
        max_tokens,
        tools,
    };

    debug!(
        model = %request.model,
        messages = request.messages.len(),
        stream = request.stream,
        tools = request.tools.as_ref().map_or(0, Vec::len),
        "Built chat payload"
    );
    request
}

/// Build an image generation request from the last message.
#[must_use]
pub fn build_image_request(messages: &[ChatMessage], config: &ModelConfig) -> ImageGenerationRequest {
    let prompt = messages
        .last()
        .map(|m| m.text_content().to_string())
        .unwrap_or_default();

    debug!(model = %config.model, size = %config.size, "Built image payload");

    ImageGenerationRequest {
        model: config.model.clone(),
        prompt,
        response_format: "b64_json".to_string(),
        n: 1,
        size: config.size.clone(),
        quality: config.quality,
        style: config.style,
    }
}
