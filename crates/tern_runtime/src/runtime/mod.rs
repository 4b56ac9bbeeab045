//! The Turn Controller.
//!
//! Split into focused submodules:
//! - **agent_loop** - the turn state machine
//! - **llm** - streaming a response and assembling it into content blocks
//! - **tools** - sequential tool dispatch

mod agent_loop;
mod llm;
mod tools;

use std::sync::Arc;

use tern_core::{Message, SessionEvent, SessionId, TokenUsage, Transcript};
use tern_llms::{Provider, ToolDefinition};
use tern_toolbus::ToolBus;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::context;
use crate::error::RuntimeError;

/// Owns one conversation and runs its turns.
pub struct Runtime {
    session_id: SessionId,
    config: RuntimeConfig,
    provider: Arc<dyn Provider>,
    toolbus: Arc<ToolBus>,
    /// Display sink
    event_tx: mpsc::Sender<SessionEvent>,
    transcript: Transcript,
    /// Tool-parameter list, fixed for the lifetime of the runtime
    tools: Vec<ToolDefinition>,
    usage: TokenUsage,
}

impl Runtime {
    /// Create a runtime with an empty transcript.
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        config: RuntimeConfig,
        provider: Arc<dyn Provider>,
        toolbus: Arc<ToolBus>,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let tools = context::tool_definitions(&toolbus);
        let session_id = SessionId::new();

        info!(
            session.id = %session_id,
            model = %config.model,
            provider = provider.provider_id(),
            tools = tools.len(),
            "Runtime created"
        );

        Ok(Self {
            session_id,
            config,
            provider,
            toolbus,
            event_tx,
            transcript: Transcript::new(),
            tools,
            usage: TokenUsage::default(),
        })
    }

    /// Append `text` as a user message and run the turn loop.
    ///
    /// The user message stays in the transcript even if the turn fails, so the
    /// next input continues the same conversation.
    pub async fn submit(
        &mut self,
        text: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<(), RuntimeError> {
        let text = text.into();
        info!(session.id = %self.session_id, chars = text.len(), "User message");
        self.transcript.push(Message::user_text(text));
        self.run_turn(cancel).await
    }

    /// Drop every message. Clearing an empty transcript is a no-op.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Swap in a loaded transcript, accepted as-is.
    pub fn replace_transcript(&mut self, transcript: Transcript) {
        self.transcript = transcript;
    }

    /// Token usage summed over every completed remote call.
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
