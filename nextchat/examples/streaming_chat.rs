//! Streaming chat with a tool.
//!
//! Streams an answer to stdout, letting the model call a `current_time`
//! tool from the "clock" plugin. Ctrl-C cancels and prints what arrived.
//!
//! Run with:
//! ```bash
//! OPENAI_API_KEY=your-key RUST_LOG=nextchat=debug cargo run --example streaming_chat -- "What time is it?"
//! ```

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use futures::StreamExt;
use nextchat::prelude::*;
use nextchat::Plugin;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What time is it? Answer in one sentence.".to_string());
    let model = std::env::var("NEXTCHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let mut clock = ToolRegistry::new();
    clock.register(FunctionTool::new(
        "current_time",
        "Current Unix time in seconds",
        json!({"type": "object", "properties": {}}),
        |_args: serde_json::Value| async {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|now| ToolReturn::json(json!({ "unix_seconds": now.as_secs() })))
                .map_err(|e| nextchat::ToolError::execution_failed(e.to_string()))
        },
    ));

    let mut plugins = PluginStore::new();
    plugins.add(Plugin::new("clock", "Clock").with_tools(clock));

    let api = ChatGptApi::new(EndpointConfig::from_env(ServiceProvider::OpenAI)?)?;
    let client = ChatClient::new(api).with_options(ChatOptions::new().with_plugins(["clock"]));
    let tools = client.tools_for(&plugins);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut events = client.chat_stream(
        vec![
            ChatMessage::system("You are a concise assistant."),
            ChatMessage::user(prompt),
        ],
        ModelConfig::new(model),
        tools,
        &cancel,
    );

    let mut stdout = io::stdout();
    while let Some(event) = events.next().await {
        match event {
            ChatEvent::Update { delta, .. } => {
                write!(stdout, "{delta}")?;
                stdout.flush()?;
            }
            ChatEvent::Finished(outcome) => {
                writeln!(
                    stdout,
                    "\n\n[{} round(s){}]",
                    outcome.rounds,
                    if outcome.cancelled { ", cancelled" } else { "" }
                )?;
            }
            ChatEvent::Failed(error) => {
                anyhow::bail!(error);
            }
        }
    }

    Ok(())
}
