//! Model capabilities.
//!
//! What a request may contain depends on the model: reasoning models reject
//! system messages and sampling parameters, image models take a different
//! payload entirely, vision models accept image parts. [`ModelCapabilities`]
//! resolves all of that once from the model name, so request building only
//! consults flags.

/// Model capabilities resolved from a model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    /// Responses can be streamed.
    pub supports_streaming: bool,
    /// System messages are accepted.
    pub supports_system_role: bool,
    /// Tool/function calling is available.
    pub supports_tools: bool,
    /// Sampling parameters are honored.
    pub supports_temperature: bool,
    /// Image content parts are accepted.
    pub supports_vision: bool,
    /// The model generates images instead of chat completions.
    pub image_generation: bool,
    /// Extended-reasoning model.
    pub reasoning: bool,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_streaming: true,
            supports_system_role: true,
            supports_tools: true,
            supports_temperature: true,
            supports_vision: false,
            image_generation: false,
            reasoning: false,
        }
    }
}

const VISION_KEYWORDS: &[&str] = &[
    "vision",
    "gpt-4o",
    "claude-3",
    "gemini-1.5",
    "gemini-pro-vision",
];

impl ModelCapabilities {
    /// Resolve capabilities for a model name.
    #[must_use]
    pub fn for_model(model: &str) -> Self {
        let model = model.trim().to_ascii_lowercase();

        if model.starts_with("dall-e") {
            return Self {
                supports_streaming: false,
                supports_system_role: false,
                supports_tools: false,
                supports_temperature: false,
                supports_vision: false,
                image_generation: true,
                reasoning: false,
            };
        }

        if model.starts_with("o1") {
            return Self {
                supports_streaming: false,
                supports_system_role: false,
                supports_tools: false,
                supports_temperature: false,
                supports_vision: false,
                image_generation: false,
                reasoning: true,
            };
        }

        Self {
            supports_vision: is_vision_model(&model),
            ..Self::default()
        }
    }

    /// Requests that take long enough to need an extended timeout.
    #[must_use]
    pub fn is_slow(&self) -> bool {
        self.image_generation || self.reasoning
    }

    /// Whether a request should stream, given the caller's preference.
    #[must_use]
    pub fn should_stream(&self, requested: bool) -> bool {
        requested && self.supports_streaming
    }
}

fn is_vision_model(model: &str) -> bool {
    VISION_KEYWORDS.iter().any(|k| model.contains(k))
        || (model.contains("gpt-4-turbo") && !model.contains("preview"))
}
