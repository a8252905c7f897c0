//! The chat orchestrator.
//!
//! [`ChatClient::chat`] runs one logical chat operation. Streaming models go
//! through rounds of: open an event stream, parse frames, accumulate text
//! and tool calls, and, if tools were requested, run them and continue with
//! a new request. Everything the caller sees goes through a
//! [`ChatHandler`], settled exactly once.

use std::time::Duration;

use futures::{Stream, StreamExt};
use nextchat_core::{ChatMessage, MessageContent, ModelConfig};
use nextchat_models::{
    build_payload, ChatGptApi, ModelCapabilities, ModelError, StreamOpen,
};
use nextchat_streaming::{parse_delta, SseEvent, StreamResult};
use nextchat_tools::{PluginStore, ToolError, ToolExecutor, ToolRegistry};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ChatOptions;
use crate::controller::{Continuation, ContinuationController};
use crate::errors::ChatError;
use crate::handler::{ChatHandler, ChatOutcome, FinishGuard};
use crate::session::StreamSession;

/// How one round's stream ended.
#[derive(Debug)]
pub(crate) enum RoundEnd {
    /// `[DONE]` or the connection closed.
    Completed,
    /// The cancellation token fired.
    Cancelled,
    /// The stream failed or stalled.
    Failed(ChatError),
}

/// Runs chat operations against one endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api: ChatGptApi,
    options: ChatOptions,
}

impl ChatClient {
    /// Create a client with default options.
    #[must_use]
    pub fn new(api: ChatGptApi) -> Self {
        Self {
            api,
            options: ChatOptions::default(),
        }
    }

    /// Set the options.
    #[must_use]
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in use.
    #[must_use]
    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Underlying API client.
    #[must_use]
    pub fn api(&self) -> &ChatGptApi {
        &self.api
    }

    /// Tools of the plugins selected in the options.
    #[must_use]
    pub fn tools_for(&self, plugins: &PluginStore) -> ToolRegistry {
        plugins.as_tools(&self.options.plugins)
    }

    /// Run one chat operation.
    ///
    /// `handler` receives any number of updates, then exactly one of
    /// `on_finish` or `on_error`. If `cancel` has already fired, nothing is
    /// sent and no callback is invoked.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        tools: &ToolRegistry,
        handler: &dyn ChatHandler,
        cancel: &CancellationToken,
    ) {
        if cancel.is_cancelled() {
            info!(model = %config.model, "Chat cancelled before start");
            return;
        }

        let mut guard = FinishGuard::new(handler);
        if let Err(e) = self.check(config) {
            error!(model = %config.model, error = %e, "Invalid chat configuration");
            guard.fail(e);
            return;
        }

        let caps = ModelCapabilities::for_model(&config.model);
        if caps.should_stream(config.stream) {
            self.run_streaming(messages, config, &caps, tools, &mut guard, cancel)
                .await;
        } else {
            self.run_once(messages, config, &caps, &mut guard, cancel).await;
        }
    }

    fn check(&self, config: &ModelConfig) -> Result<(), ChatError> {
        config.validate()?;
        self.options.validate()?;
        self.api.endpoint().validate()?;
        Ok(())
    }

    /// Single request-response cycle for non-streaming models.
    async fn run_once(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        caps: &ModelCapabilities,
        guard: &mut FinishGuard<'_>,
        cancel: &CancellationToken,
    ) {
        let payload = build_payload(messages, config, caps, &[]);
        let timeout = self.options.timeout_for(caps);

        match self.api.complete(&payload, timeout, cancel).await {
            Ok(content) => {
                info!(model = %config.model, "Chat finished");
                guard.finish(ChatOutcome {
                    messages: vec![ChatMessage::assistant(content.clone())],
                    content,
                    rounds: 1,
                    cancelled: false,
                });
            }
            Err(ModelError::Cancelled) => {
                info!(model = %config.model, "Chat cancelled");
                guard.finish(ChatOutcome {
                    content: MessageContent::default(),
                    messages: Vec::new(),
                    rounds: 1,
                    cancelled: true,
                });
            }
            Err(ModelError::Timeout(limit)) => {
                error!(model = %config.model, ?limit, "Request timed out");
                guard.fail(ChatError::Timeout(limit));
            }
            Err(e) => {
                error!(model = %config.model, error = %e, "Request failed");
                guard.fail(e.into());
            }
        }
    }

    async fn run_streaming(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
        caps: &ModelCapabilities,
        tools: &ToolRegistry,
        guard: &mut FinishGuard<'_>,
        cancel: &CancellationToken,
    ) {
        let timeout = self.options.timeout_for(caps);
        let definitions = tools.definitions();
        let executor = ToolExecutor::new(tools.clone()).with_timeout(timeout);
        let controller = ContinuationController::new(self.options.max_rounds);

        let mut conversation = messages.to_vec();
        let mut appended: Vec<ChatMessage> = Vec::new();
        let mut session = StreamSession::new(cancel.clone());
        let mut ticker = tokio::time::interval(self.options.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            session.begin_round();
            info!(
                session_id = session.id(),
                round = session.round(),
                model = %config.model,
                "Starting round"
            );

            let payload = build_payload(&conversation, config, caps, &definitions);
            let opened =
                tokio::time::timeout(timeout, self.api.open_stream(&payload, cancel)).await;
            let mut events = match opened {
                Err(_) => {
                    error!(session_id = session.id(), ?timeout, "Opening the stream timed out");
                    session.fail();
                    guard.fail(ChatError::Timeout(timeout));
                    return;
                }
                Ok(Ok(StreamOpen::Events(events))) => events,
                Ok(Ok(StreamOpen::Degraded(diagnostic))) => {
                    info!(
                        session_id = session.id(),
                        status = diagnostic.status,
                        "Response degraded to diagnostic text"
                    );
                    session.degrade(&diagnostic.text);
                    settle_finished(&mut session, appended, guard, false);
                    return;
                }
                Ok(Err(ModelError::Cancelled)) => {
                    settle_cancelled(&mut session, appended, guard);
                    return;
                }
                Ok(Err(e)) => {
                    error!(session_id = session.id(), error = %e, "Transport error");
                    session.fail();
                    guard.fail(e.into());
                    return;
                }
            };

            match pump_round(&mut session, &mut events, guard, &mut ticker, timeout).await {
                RoundEnd::Completed => {}
                RoundEnd::Cancelled => {
                    settle_cancelled(&mut session, appended, guard);
                    return;
                }
                RoundEnd::Failed(e) => {
                    error!(session_id = session.id(), error = %e, "Stream failed");
                    session.fail();
                    guard.fail(e);
                    return;
                }
            }

            let calls = match controller.after_stream(&mut session) {
                Ok(Continuation::Finish) => {
                    settle_finished(&mut session, appended, guard, false);
                    return;
                }
                Ok(Continuation::RunTools(calls)) => calls,
                Err(e) => {
                    error!(session_id = session.id(), error = %e, "Round limit reached");
                    guard.fail(e);
                    return;
                }
            };

            let results = {
                let run = executor.execute_all(&calls, cancel);
                tokio::pin!(run);
                loop {
                    tokio::select! {
                        biased;
                        result = &mut run => break result,
                        _ = ticker.tick() => {
                            if !session.is_cancelled() {
                                emit_frame(&mut session, guard);
                            }
                        }
                    }
                }
            };

            match results {
                Ok(results) => ContinuationController::append_tool_round(
                    &mut conversation,
                    &mut appended,
                    session.round_text(),
                    calls,
                    results,
                ),
                Err(ToolError::Cancelled) => {
                    settle_cancelled(&mut session, appended, guard);
                    return;
                }
                Err(e) => {
                    error!(session_id = session.id(), error = %e, "Tool round failed");
                    session.fail();
                    guard.fail(e.into());
                    return;
                }
            }
        }
    }
}

/// Read one round's frames into `session` until the stream ends.
///
/// Animation frames are released on every `ticker` tick meanwhile. A gap of
/// `idle` between two frames fails the round.
pub(crate) async fn pump_round<S>(
    session: &mut StreamSession,
    events: &mut S,
    guard: &FinishGuard<'_>,
    ticker: &mut Interval,
    idle: Duration,
) -> RoundEnd
where
    S: Stream<Item = StreamResult<SseEvent>> + Unpin,
{
    let cancel = session.cancel_token().clone();
    let mut deadline = Instant::now() + idle;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return RoundEnd::Cancelled,
            _ = ticker.tick() => emit_frame(session, guard),
            next = tokio::time::timeout_at(deadline, events.next()) => match next {
                Err(_) => return RoundEnd::Failed(ChatError::Timeout(idle)),
                Ok(None) => return RoundEnd::Completed,
                Ok(Some(Err(e))) => return RoundEnd::Failed(e.into()),
                Ok(Some(Ok(event))) => {
                    deadline = Instant::now() + idle;
                    if session.apply(parse_delta(&event.data)) {
                        debug!(session_id = session.id(), "Received [DONE]");
                        return RoundEnd::Completed;
                    }
                }
            },
        }
    }
}

fn emit_frame(session: &mut StreamSession, guard: &FinishGuard<'_>) {
    if let Some(frame) = session.tick() {
        guard.update(&frame.text, &frame.delta);
    }
}

fn settle_finished(
    session: &mut StreamSession,
    mut appended: Vec<ChatMessage>,
    guard: &mut FinishGuard<'_>,
    cancelled: bool,
) {
    if let Some(frame) = session.flush() {
        guard.update(&frame.text, &frame.delta);
    }

    let content = MessageContent::text(session.text());
    appended.push(ChatMessage::assistant(content.clone()));
    info!(
        session_id = session.id(),
        rounds = session.round(),
        cancelled,
        "Chat finished"
    );
    guard.finish(ChatOutcome {
        content,
        messages: appended,
        rounds: session.round(),
        cancelled,
    });
}

fn settle_cancelled(
    session: &mut StreamSession,
    appended: Vec<ChatMessage>,
    guard: &mut FinishGuard<'_>,
) {
    session.cancel();
    settle_finished(session, appended, guard, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing::RecordingHandler;
    use bytes::Bytes;
    use futures::stream;
    use nextchat_core::Role;
    use nextchat_models::{EndpointConfig, UNAUTHORIZED_NOTICE};
    use nextchat_streaming::{SseStream, ToolCallFragment};
    use nextchat_tools::{FunctionTool, ToolReturn};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value as JsonValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_frame(text: &str) -> String {
        format!("data: {}\n\n", json!({"choices": [{"delta": {"content": text}}]}))
    }

    fn tool_frame(fragment: ToolCallFragment) -> String {
        format!("data: {}\n\n", json!({"choices": [{"delta": {"tool_calls": [fragment]}}]}))
    }

    fn sse(frames: &[String]) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_raw(frames.concat(), "text/event-stream")
    }

    fn client(server: &MockServer) -> ChatClient {
        let api =
            ChatGptApi::new(EndpointConfig::openai("sk-test").with_base_url(server.uri())).unwrap();
        ChatClient::new(api).with_options(
            ChatOptions::new()
                .with_frame_interval(Duration::from_millis(1))
                .with_request_timeout(Duration::from_secs(5)),
        )
    }

    fn clock_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(FunctionTool::new(
            "now",
            "Current time",
            json!({"type": "object", "properties": {}}),
            |_args: JsonValue| async { Ok(ToolReturn::text("12:00")) },
        ));
        registry
    }

    async fn request_bodies(server: &MockServer) -> Vec<JsonValue> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_streamed_text_is_delivered_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(sse(&[
                text_frame("He"),
                text_frame("llo"),
                text_frame(", world"),
                "data: [DONE]\n\n".to_string(),
            ]))
            .expect(1)
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4"),
                &ToolRegistry::new(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        let outcome = handler.outcome();
        assert_eq!(outcome.text(), "Hello, world");
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].role, Role::Assistant);
        assert!(handler.errors.lock().is_empty());

        let updates = handler.updates.lock();
        let last = updates.last().unwrap();
        assert_eq!(last.0, "Hello, world");
        let deltas: String = updates.iter().map(|(_, d)| d.as_str()).collect();
        assert_eq!(deltas, "Hello, world");
    }

    #[tokio::test]
    async fn test_tool_round_appends_two_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[
                tool_frame(ToolCallFragment::start(0, "call_1", "now", "{")),
                tool_frame(ToolCallFragment::continuation(0, "}")),
                "data: [DONE]\n\n".to_string(),
            ]))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(sse(&[text_frame("It is 12:00.")]))
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::user("what time is it?")],
                &ModelConfig::new("gpt-4"),
                &clock_registry(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 2);
        let first = bodies[0]["messages"].as_array().unwrap().len();
        let second = bodies[1]["messages"].as_array().unwrap();
        assert_eq!(second.len(), first + 2);
        assert_eq!(second[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(second[1]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(second[2]["role"], "tool");
        assert_eq!(second[2]["tool_call_id"], "call_1");
        assert_eq!(second[2]["content"], "12:00");
        assert_eq!(bodies[0]["tools"][0]["function"]["name"], "now");

        let outcome = handler.outcome();
        assert_eq!(outcome.text(), "It is 12:00.");
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.messages.len(), 3);
        assert_eq!(handler.settle_count(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_degrades_to_finished_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("Incorrect API key provided"),
            )
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4"),
                &ToolRegistry::new(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        assert!(handler.errors.lock().is_empty());
        let outcome = handler.outcome();
        assert!(outcome.text().contains(UNAUTHORIZED_NOTICE));
        assert!(outcome.text().contains("Incorrect API key provided"));
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn test_done_and_connection_close_finish_identically() {
        let frames = vec![text_frame("same "), text_frame("answer")];
        let mut outcomes = Vec::new();

        for terminated in [true, false] {
            let server = MockServer::start().await;
            let mut body = frames.clone();
            if terminated {
                body.push("data: [DONE]\n\n".to_string());
            }
            Mock::given(method("POST"))
                .respond_with(sse(&body))
                .mount(&server)
                .await;

            let handler = RecordingHandler::default();
            client(&server)
                .chat(
                    &[ChatMessage::user("hi")],
                    &ModelConfig::new("gpt-4"),
                    &ToolRegistry::new(),
                    &handler,
                    &CancellationToken::new(),
                )
                .await;
            outcomes.push(handler.outcome());
        }

        assert_eq!(outcomes[0].content, outcomes[1].content);
        assert_eq!(outcomes[0].rounds, outcomes[1].rounds);
        assert_eq!(outcomes[0].cancelled, outcomes[1].cancelled);
    }

    struct CancellingHandler {
        inner: RecordingHandler,
        cancel: CancellationToken,
    }

    impl ChatHandler for CancellingHandler {
        fn on_update(&self, text: &str, delta: &str) {
            self.cancel.cancel();
            self.cancel.cancel();
            self.inner.on_update(text, delta);
        }

        fn on_finish(&self, outcome: ChatOutcome) {
            self.cancel.cancel();
            self.inner.on_finish(outcome);
        }

        fn on_error(&self, error: ChatError) {
            self.inner.on_error(error);
        }
    }

    #[tokio::test]
    async fn test_cancellation_never_finishes_twice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[text_frame("partial answer"), text_frame(" and more")]))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let handler = CancellingHandler {
            inner: RecordingHandler::default(),
            cancel: cancel.clone(),
        };
        client(&server)
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4"),
                &ToolRegistry::new(),
                &handler,
                &cancel,
            )
            .await;

        cancel.cancel();
        cancel.cancel();
        assert_eq!(handler.inner.settle_count(), 1);
        assert_eq!(handler.inner.finished.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_response_headers_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[text_frame("late")]).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        let started = Instant::now();
        client(&server)
            .with_options(
                ChatOptions::new()
                    .with_frame_interval(Duration::from_millis(1))
                    .with_request_timeout(Duration::from_millis(200)),
            )
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4"),
                &ToolRegistry::new(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(handler.finished.lock().is_empty());
        let errors = handler.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ChatError::Timeout(_)));
    }

    struct CancelWatchingHandler {
        inner: RecordingHandler,
        cancel: CancellationToken,
        updates_after_cancel: AtomicUsize,
    }

    impl ChatHandler for CancelWatchingHandler {
        fn on_update(&self, text: &str, delta: &str) {
            if self.cancel.is_cancelled() {
                self.updates_after_cancel.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.on_update(text, delta);
        }

        fn on_finish(&self, outcome: ChatOutcome) {
            self.inner.on_finish(outcome);
        }

        fn on_error(&self, error: ChatError) {
            self.inner.on_error(error);
        }
    }

    #[tokio::test]
    async fn test_cancel_during_tool_round_stops_updates() {
        let server = MockServer::start().await;
        let long_text = "x".repeat(600);
        Mock::given(method("POST"))
            .respond_with(sse(&[
                text_frame(&long_text),
                tool_frame(ToolCallFragment::start(0, "call_1", "slow", "{}")),
                "data: [DONE]\n\n".to_string(),
            ]))
            .mount(&server)
            .await;

        let mut tools = ToolRegistry::new();
        tools.register(FunctionTool::new(
            "slow",
            "Never returns in time",
            json!({"type": "object", "properties": {}}),
            |_args: JsonValue| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(ToolReturn::text("done"))
            },
        ));

        let cancel = CancellationToken::new();
        let handler = CancelWatchingHandler {
            inner: RecordingHandler::default(),
            cancel: cancel.clone(),
            updates_after_cancel: AtomicUsize::new(0),
        };
        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(150)).await;
                cancel.cancel();
            })
        };

        client(&server)
            .with_options(
                ChatOptions::new()
                    .with_frame_interval(Duration::from_millis(10))
                    .with_request_timeout(Duration::from_secs(30)),
            )
            .chat(
                &[ChatMessage::user("run it")],
                &ModelConfig::new("gpt-4"),
                &tools,
                &handler,
                &cancel,
            )
            .await;
        canceller.await.unwrap();

        let outcome = handler.inner.outcome();
        assert!(outcome.cancelled);
        assert_eq!(outcome.text(), long_text);
        assert_eq!(handler.inner.settle_count(), 1);
        // Only the final flush may follow the cancellation.
        assert!(handler.updates_after_cancel.load(Ordering::SeqCst) <= 1);
        assert_eq!(handler.inner.updates.lock().last().unwrap().0, long_text);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[text_frame("never")]))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4"),
                &ToolRegistry::new(),
                &handler,
                &cancel,
            )
            .await;

        assert_eq!(handler.settle_count(), 0);
        assert!(handler.updates.lock().is_empty());
    }

    #[tokio::test]
    async fn test_round_limit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[tool_frame(ToolCallFragment::start(
                0, "call_x", "now", "{}",
            ))]))
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .with_options(ChatOptions::new().with_max_rounds(2))
            .chat(
                &[ChatMessage::user("loop")],
                &ModelConfig::new("gpt-4"),
                &clock_registry(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        assert!(handler.finished.lock().is_empty());
        let errors = handler.errors.lock();
        assert!(matches!(errors[0], ChatError::MaxRoundsExceeded { rounds: 2 }));
        assert_eq!(request_bodies(&server).await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[]))
            .expect(0)
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::user("hi")],
                &ModelConfig::new("gpt-4").with_temperature(5.0),
                &ToolRegistry::new(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        let errors = handler.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_configuration());
    }

    #[tokio::test]
    async fn test_non_streaming_model_completes_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Thought about it."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handler = RecordingHandler::default();
        client(&server)
            .chat(
                &[ChatMessage::system("ignored"), ChatMessage::user("think")],
                &ModelConfig::new("o1-mini"),
                &clock_registry(),
                &handler,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(handler.outcome().text(), "Thought about it.");
        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[0]["stream"], false);
        assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 1);
        assert!(bodies[0].get("tools").is_none());
    }

    fn frames(texts: &[&str]) -> SseStream<stream::BoxStream<'static, Result<Bytes, std::io::Error>>> {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            texts.iter().map(|t| Ok(Bytes::from(text_frame(t)))).collect();
        SseStream::new(stream::iter(chunks).chain(stream::pending()).boxed())
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let handler = RecordingHandler::default();
        let guard = FinishGuard::new(&handler);
        let mut session = StreamSession::new(CancellationToken::new());
        session.begin_round();
        let mut ticker = tokio::time::interval(Duration::from_millis(5));

        let end = pump_round(
            &mut session,
            &mut frames(&["slow"]),
            &guard,
            &mut ticker,
            Duration::from_millis(50),
        )
        .await;

        assert!(matches!(end, RoundEnd::Failed(ChatError::Timeout(_))));
        assert_eq!(session.text(), "slow");
    }

    #[tokio::test]
    async fn test_cancel_stops_an_open_stream() {
        let handler = RecordingHandler::default();
        let guard = FinishGuard::new(&handler);
        let cancel = CancellationToken::new();
        let mut session = StreamSession::new(cancel.clone());
        session.begin_round();
        let mut ticker = tokio::time::interval(Duration::from_millis(5));

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel();
            })
        };

        let end = pump_round(
            &mut session,
            &mut frames(&["partial"]),
            &guard,
            &mut ticker,
            Duration::from_secs(5),
        )
        .await;
        canceller.await.unwrap();

        assert!(matches!(end, RoundEnd::Cancelled));
        assert_eq!(session.text(), "partial");
        assert!(!handler.updates.lock().is_empty());
    }

    #[test]
    fn test_tools_for_selected_plugins() {
        use nextchat_tools::Plugin;

        let mut store = PluginStore::new();
        store.add(Plugin::new("clock", "Clock").with_tools(clock_registry()));
        store.add(Plugin::new("other", "Other"));

        let api = ChatGptApi::new(EndpointConfig::openai("sk")).unwrap();
        let client = ChatClient::new(api).with_options(ChatOptions::new().with_plugins(["clock"]));
        let tools = client.tools_for(&store);
        assert!(tools.contains("now"));
        assert_eq!(tools.len(), 1);
    }
}
