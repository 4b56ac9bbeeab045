//! `tern chat`: the interactive session.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use indicatif::ProgressBar;
use tern_core::SessionEvent;
use tern_llms::{AnthropicConfig, AnthropicProvider};
use tern_runtime::{Runtime, RuntimeError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::SessionArgs;
use crate::commands::slash::{Flow, SlashCommand};
use crate::commands::toolbus::build_toolbus;
use crate::output;

pub async fn handle(session: SessionArgs) -> Result<()> {
    let api_key = session.api_key().ok_or_else(|| {
        anyhow!("No API key provided. Set ANTHROPIC_API_KEY environment variable or use --api-key.")
    })?;
    let config = session.runtime_config()?;
    let toolbus = build_toolbus(&session)?;

    let mut anthropic = AnthropicConfig::new(api_key);
    if let Some(base_url) = std::env::var("ANTHROPIC_BASE_URL")
        .ok()
        .filter(|url| !url.is_empty())
    {
        anthropic = anthropic.with_base_url(base_url);
    }
    let provider = Arc::new(AnthropicProvider::new(anthropic)?);

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let mut runtime = Runtime::new(config, provider, Arc::new(toolbus), event_tx)?;
    info!(session.id = %runtime.session_id(), "Chat session started");

    output::banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output::user_prompt();

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!("\nExiting...");
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = SlashCommand::parse(line) {
            match command.execute(&mut runtime) {
                Flow::Continue => continue,
                Flow::Exit => break,
            }
        }

        output::assistant_label();
        let mut renderer = Renderer::new();
        let result = run_turn(&mut runtime, line, &mut event_rx, &mut renderer).await;
        renderer.settle();
        println!("\n");

        if let Err(e) = result {
            debug!(error = %e, "Turn ended without an answer");
        }
    }

    let usage = runtime.usage();
    info!(
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        cache_read_tokens = usage.cache_read_tokens,
        cache_write_tokens = usage.cache_write_tokens,
        "Chat session ended"
    );
    Ok(())
}

/// Submit one input and render events until the turn finishes.
///
/// Ctrl-C cancels the turn in flight; the prompt comes back afterwards.
async fn run_turn(
    runtime: &mut Runtime,
    line: &str,
    events: &mut mpsc::Receiver<SessionEvent>,
    renderer: &mut Renderer,
) -> Result<(), RuntimeError> {
    let cancel = CancellationToken::new();
    let result = {
        let turn = runtime.submit(line, &cancel);
        tokio::pin!(turn);
        loop {
            tokio::select! {
                result = &mut turn => break result,
                Some(event) = events.recv() => renderer.render(event),
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => cancel.cancel(),
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        renderer.render(event);
    }
    result
}

/// Prints session events, with a spinner while waiting on the model.
struct Renderer {
    spinner: Option<ProgressBar>,
    /// Thinking fragments are being printed on the current line
    thinking: bool,
}

impl Renderer {
    fn new() -> Self {
        Self {
            spinner: None,
            thinking: false,
        }
    }

    fn end_thinking(&mut self) {
        if std::mem::take(&mut self.thinking) {
            println!();
        }
    }

    fn wait(&mut self) {
        if self.spinner.is_none() {
            self.spinner = Some(output::spinner("Waiting for Claude..."));
        }
    }

    fn settle(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn render(&mut self, event: SessionEvent) {
        if !matches!(event, SessionEvent::ThinkingDelta { .. }) {
            self.end_thinking();
        }
        match event {
            SessionEvent::TurnStart { .. } => self.wait(),
            SessionEvent::TextDelta { text } => {
                self.settle();
                output::assistant_text(&text);
            }
            SessionEvent::ThinkingDelta { text } => {
                self.settle();
                if !self.thinking {
                    output::thinking_header();
                    self.thinking = true;
                }
                output::thinking_text(&text);
            }
            SessionEvent::Thinking { thinking } => {
                self.settle();
                output::thinking(&thinking);
            }
            SessionEvent::ToolStart { name, input, .. } => {
                self.settle();
                output::tool_use(&name, &input);
            }
            SessionEvent::ToolDone { outcome, .. } => output::tool_outcome(&outcome),
            SessionEvent::Status { message } => {
                self.settle();
                output::dim(&format!("\n[{}]", message));
            }
            SessionEvent::TurnEnd => self.settle(),
            SessionEvent::Error { error } => {
                self.settle();
                output::api_error(&error);
            }
        }
    }
}
