//! Direct chat requests.
//!
//! These functions run one chat operation and wait for its outcome, for
//! scripts and one-off queries that need neither paced updates nor a
//! handler.
//!
//! # Example
//!
//! ```rust,no_run
//! use nextchat::direct::chat_request;
//! use nextchat::{ChatMessage, EndpointConfig, ModelConfig, ToolRegistry};
//!
//! # async fn run() -> Result<(), nextchat::direct::DirectError> {
//! let outcome = chat_request(
//!     EndpointConfig::openai("sk-..."),
//!     &[ChatMessage::user("What is the capital of France?")],
//!     &ModelConfig::new("gpt-4o-mini"),
//!     &ToolRegistry::new(),
//! )
//! .await?;
//!
//! println!("{}", outcome.text());
//! # Ok(())
//! # }
//! ```

use futures::StreamExt;
use nextchat_agent::{ChatClient, ChatError, ChatEvent, ChatOutcome};
use nextchat_core::{ChatMessage, ModelConfig};
use nextchat_models::{ChatGptApi, EndpointConfig, ModelError};
use nextchat_tools::ToolRegistry;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error type for direct requests.
#[derive(Debug, Error)]
pub enum DirectError {
    /// The endpoint could not be set up.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The chat operation failed.
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// The operation ended without settling.
    #[error("Chat ended without an outcome")]
    NoOutcome,

    /// Runtime error (e.g. sync function called in async context).
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Run one chat operation against `endpoint` and wait for its outcome.
///
/// # Errors
///
/// Returns `DirectError::Model` for an unusable endpoint and
/// `DirectError::Chat` when the operation fails.
pub async fn chat_request(
    endpoint: EndpointConfig,
    messages: &[ChatMessage],
    config: &ModelConfig,
    tools: &ToolRegistry,
) -> Result<ChatOutcome, DirectError> {
    let client = ChatClient::new(ChatGptApi::new(endpoint)?);
    chat_with(&client, messages, config, tools).await
}

/// Run one chat operation with a prepared client and wait for its outcome.
///
/// # Errors
///
/// Returns `DirectError::Chat` when the operation fails.
pub async fn chat_with(
    client: &ChatClient,
    messages: &[ChatMessage],
    config: &ModelConfig,
    tools: &ToolRegistry,
) -> Result<ChatOutcome, DirectError> {
    let mut stream = client.chat_stream(
        messages.to_vec(),
        config.clone(),
        tools.clone(),
        &CancellationToken::new(),
    );

    while let Some(event) = stream.next().await {
        match event {
            ChatEvent::Update { .. } => {}
            ChatEvent::Finished(outcome) => return Ok(outcome),
            ChatEvent::Failed(error) => return Err(error.into()),
        }
    }
    Err(DirectError::NoOutcome)
}

/// Blocking variant of [`chat_request`].
///
/// Creates a current-thread runtime per call.
///
/// # Errors
///
/// Returns `DirectError::Runtime` when called from within a runtime, or any
/// error of [`chat_request`].
pub fn chat_request_sync(
    endpoint: EndpointConfig,
    messages: &[ChatMessage],
    config: &ModelConfig,
    tools: &ToolRegistry,
) -> Result<ChatOutcome, DirectError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(DirectError::Runtime(
            "chat_request_sync cannot be called from async context. Use chat_request instead."
                .to_string(),
        ));
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DirectError::Runtime(format!("Failed to create runtime: {e}")))?;

    rt.block_on(chat_request(endpoint, messages, config, tools))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_request_returns_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    format!(
                        "data: {}\n\ndata: [DONE]\n\n",
                        json!({"choices": [{"delta": {"content": "Paris"}}]})
                    ),
                    "text/event-stream",
                ),
            )
            .mount(&server)
            .await;

        let outcome = chat_request(
            EndpointConfig::openai("sk-test").with_base_url(server.uri()),
            &[ChatMessage::user("Capital of France?")],
            &ModelConfig::new("gpt-4o-mini"),
            &ToolRegistry::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.text(), "Paris");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_fails_early() {
        let err = chat_request(
            EndpointConfig::openai("sk").with_base_url(""),
            &[ChatMessage::user("hi")],
            &ModelConfig::new("gpt-4"),
            &ToolRegistry::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DirectError::Model(e) if e.is_configuration()));
    }

    #[tokio::test]
    async fn test_sync_rejects_async_context() {
        let err = chat_request_sync(
            EndpointConfig::openai("sk"),
            &[ChatMessage::user("hi")],
            &ModelConfig::new("gpt-4"),
            &ToolRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DirectError::Runtime(_)));
    }
}
