//! Turn state machine.

use tern_core::{ContentBlock, Message, SessionEvent};
use tern_llms::GenerateRequest;
use tern_observability::{record_error, turn_span};
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument, Span};

use crate::cache;
use crate::context;
use crate::error::RuntimeError;

use super::Runtime;

/// States of one step. A turn is a sequence of steps ending in `Done`.
#[derive(Debug)]
enum TurnState {
    AwaitingSend,
    Streaming(GenerateRequest),
    DispatchingTools(Vec<ContentBlock>),
    Appended {
        assistant: Message,
        results: Vec<ContentBlock>,
    },
    Done,
}

impl Runtime {
    /// Run the turn loop on the transcript as it is.
    ///
    /// Returns once the model answers without a tool invocation. On failure or
    /// cancellation the step in progress appends nothing; steps that already
    /// completed stay in the transcript.
    pub async fn run_turn(&mut self, cancel: &CancellationToken) -> Result<(), RuntimeError> {
        let mut step: u32 = 0;
        let mut span = Span::none();
        let mut state = TurnState::AwaitingSend;

        loop {
            state = match state {
                TurnState::AwaitingSend => {
                    span = turn_span!(self.session_id, step);
                    let _ = self.event_tx.send(SessionEvent::turn_start(step)).await;

                    let marked =
                        cache::annotate(&mut self.transcript, self.config.max_cache_breakpoints);
                    span.in_scope(|| {
                        info!(
                            messages = self.transcript.len(),
                            cache_breakpoints = marked,
                            "Sending transcript"
                        )
                    });

                    TurnState::Streaming(context::build_request(
                        &self.config,
                        &self.transcript,
                        &self.tools,
                    ))
                }

                TurnState::Streaming(request) => {
                    match self
                        .stream_response(request, cancel)
                        .instrument(span.clone())
                        .await
                    {
                        Ok(blocks) => TurnState::DispatchingTools(blocks),
                        Err(e) => return self.fail_step(&span, e).await,
                    }
                }

                TurnState::DispatchingTools(blocks) => {
                    match self
                        .dispatch_tools(&blocks, cancel)
                        .instrument(span.clone())
                        .await
                    {
                        Ok(results) => TurnState::Appended {
                            assistant: Message::assistant(blocks),
                            results,
                        },
                        Err(e) => return self.fail_step(&span, e).await,
                    }
                }

                TurnState::Appended { assistant, results } => {
                    let done = !assistant.has_tool_use();
                    self.transcript.push(assistant);
                    let next = if done {
                        TurnState::Done
                    } else {
                        self.transcript.push(Message::user(results));
                        step += 1;
                        TurnState::AwaitingSend
                    };
                    let _ = self.event_tx.send(SessionEvent::turn_end()).await;
                    next
                }

                TurnState::Done => {
                    info!(session.id = %self.session_id, steps = step + 1, "Turn complete");
                    return Ok(());
                }
            };
        }
    }

    /// Report a failed step and end the turn. The transcript is not touched.
    async fn fail_step(&self, span: &Span, err: RuntimeError) -> Result<(), RuntimeError> {
        match &err {
            RuntimeError::Cancelled => {
                span.in_scope(|| info!("Step cancelled"));
                let _ = self.event_tx.send(SessionEvent::status(err.to_string())).await;
            }
            _ => {
                span.in_scope(|| record_error(&err));
                let _ = self.event_tx.send(SessionEvent::error(err.to_string())).await;
            }
        }
        let _ = self.event_tx.send(SessionEvent::turn_end()).await;
        Err(err)
    }
}
