//! Chat-completions client.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nextchat_core::{ContentPart, MessageContent};
use reqwest::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::types::RequestPayload;
use crate::config::{EndpointConfig, EndpointKind};
use crate::error::{ModelError, ModelResult};
use crate::transport::{fenced_json, open_event_stream, StreamOpen};
use crate::upload::{DataUrlUploader, ImageUploader};

/// Client for an OpenAI-compatible chat-completions service.
#[derive(Clone)]
pub struct ChatGptApi {
    client: Client,
    endpoint: EndpointConfig,
    uploader: Arc<dyn ImageUploader>,
}

impl std::fmt::Debug for ChatGptApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGptApi")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ChatGptApi {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is unusable.
    pub fn new(endpoint: EndpointConfig) -> ModelResult<Self> {
        endpoint.validate()?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            uploader: Arc::new(DataUrlUploader),
        })
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the uploader used for generated images.
    #[must_use]
    pub fn with_uploader(mut self, uploader: Arc<dyn ImageUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    /// Endpoint configuration.
    #[must_use]
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Build the HTTP request for `payload`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or headers cannot be built.
    pub fn request(&self, payload: &RequestPayload) -> ModelResult<RequestBuilder> {
        let kind = match payload {
            RequestPayload::Chat(_) => EndpointKind::Chat,
            RequestPayload::Image(_) => EndpointKind::Image,
        };
        let url = self.endpoint.endpoint_url(kind, payload.model())?;
        Ok(self
            .client
            .post(url)
            .headers(self.endpoint.headers()?)
            .json(payload))
    }

    /// Send a streaming request and open its response.
    ///
    /// # Errors
    ///
    /// See [`open_event_stream`].
    pub async fn open_stream(
        &self,
        payload: &RequestPayload,
        cancel: &CancellationToken,
    ) -> ModelResult<StreamOpen> {
        debug!(model = payload.model(), "Opening event stream");
        open_event_stream(self.request(payload)?, cancel).await
    }

    /// Send a non-streaming request and extract the answer.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Timeout` when `timeout` elapses,
    /// `ModelError::Cancelled` when `cancel` fires, and an HTTP error for a
    /// failed response whose body is not JSON.
    pub async fn complete(
        &self,
        payload: &RequestPayload,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ModelResult<MessageContent> {
        let request = self.request(payload)?.timeout(timeout);
        debug!(model = payload.model(), timeout_ms = timeout.as_millis() as u64, "Sending request");

        let fetch = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ModelError::Cancelled),
            result = fetch => result.map_err(|e| match ModelError::from(e) {
                ModelError::Timeout(_) => ModelError::Timeout(timeout),
                other => other,
            })?,
        };

        match serde_json::from_str::<JsonValue>(&body) {
            Ok(value) => self.extract_message(value).await,
            Err(_) if !status.is_success() => Err(ModelError::http(status.as_u16(), body)),
            Err(e) => Err(ModelError::invalid_response(format!(
                "response is not JSON: {e}"
            ))),
        }
    }

    /// Extract the answer from a non-streaming response body.
    ///
    /// An error body is shown fenced; image responses become an image part,
    /// uploading inline image data first.
    ///
    /// # Errors
    ///
    /// Returns an error if inline image data cannot be decoded or uploaded.
    pub async fn extract_message(&self, value: JsonValue) -> ModelResult<MessageContent> {
        if value.get("error").is_some() {
            warn!("Response carries an error");
            return Ok(MessageContent::text(fenced_json(&value, "")));
        }

        if let Some(image) = value.get("data").and_then(|d| d.get(0)) {
            let url = match (image.get("url"), image.get("b64_json")) {
                (Some(JsonValue::String(url)), _) => url.clone(),
                (_, Some(JsonValue::String(data))) => {
                    let bytes = STANDARD.decode(data.as_bytes()).map_err(|e| {
                        ModelError::invalid_response(format!("invalid image data: {e}"))
                    })?;
                    self.uploader.upload(bytes, &mime::IMAGE_PNG).await?
                }
                _ => return Err(ModelError::invalid_response("image response without data")),
            };
            return Ok(MessageContent::Parts(vec![ContentPart::image_url(url)]));
        }

        match value.pointer("/choices/0/message") {
            Some(message) => Ok(MessageContent::text(
                message
                    .get("content")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default(),
            )),
            None => Ok(MessageContent::text(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::payload::build_payload;
    use crate::profile::ModelCapabilities;
    use nextchat_core::{ChatMessage, ModelConfig};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> ChatGptApi {
        ChatGptApi::new(EndpointConfig::openai("sk-test").with_base_url(server.uri())).unwrap()
    }

    fn payload(model: &str, stream: bool) -> RequestPayload {
        let config = ModelConfig::new(model).with_stream(stream);
        build_payload(
            &[ChatMessage::user("hello")],
            &config,
            &ModelCapabilities::for_model(model),
            &[],
        )
    }

    #[tokio::test]
    async fn test_complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi there"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let content = api(&server)
            .complete(&payload("gpt-4", false), Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(content, MessageContent::text("Hi there"));
    }

    #[tokio::test]
    async fn test_error_body_is_fenced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "bad model"}})),
            )
            .mount(&server)
            .await;

        let content = api(&server)
            .complete(&payload("gpt-4", false), Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        let text = content.text_content();
        assert!(text.starts_with("```\n{"));
        assert!(text.ends_with("\n```"));
        assert!(text.contains("bad model"));
    }

    #[tokio::test]
    async fn test_image_generation_uploads_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(json!({"prompt": "hello", "response_format": "b64_json"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": "cG5n"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let content = api(&server)
            .complete(&payload("dall-e-3", false), Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            content,
            MessageContent::Parts(vec![ContentPart::image_url("data:image/png;base64,cG5n")])
        );
    }

    #[tokio::test]
    async fn test_image_url_is_used_directly() {
        let api = ChatGptApi::new(EndpointConfig::openai("sk")).unwrap();
        let content = api
            .extract_message(json!({"data": [{"url": "https://img.example.com/1.png"}]}))
            .await
            .unwrap();
        assert!(content.has_images());
    }

    #[tokio::test]
    async fn test_non_json_failure_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = api(&server)
            .complete(&payload("gpt-4", false), Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = api(&server)
            .complete(
                &payload("gpt-4", false),
                Duration::from_millis(100),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_open_stream_sends_stream_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: [DONE]\n\n", "text/event-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let open = api(&server)
            .open_stream(&payload("gpt-4", true), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(open, StreamOpen::Events(_)));
    }
}
