//! Streaming a response and assembling it into content blocks.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use futures::StreamExt;
use tern_core::{ContentBlock, SessionEvent, TokenUsage};
use tern_llms::{FinishReason, GenerateRequest, ResponseBlock, StreamEvent, Usage};
use tern_observability::record_duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RuntimeError;

use super::Runtime;

/// Collects completed blocks of one response, ordered by stream index.
///
/// Deltas are not buffered here: text and thinking fragments go straight back
/// to the caller for display and the assembled text arrives with the block's
/// completion.
#[derive(Debug, Default)]
pub(crate) struct StreamAssembler {
    blocks: BTreeMap<usize, Option<ContentBlock>>,
    /// Thinking blocks already shown fragment by fragment
    streamed_thinking: HashSet<usize>,
    usage: Option<Usage>,
    stop_reason: Option<FinishReason>,
}

impl StreamAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one event. Returns the display event it produces, if any.
    pub(crate) fn push(&mut self, event: StreamEvent) -> Result<Option<SessionEvent>, RuntimeError> {
        match event {
            StreamEvent::Start { id } => {
                debug!(message.id = %id, "Response started");
                Ok(None)
            }
            StreamEvent::TextDelta { delta, .. } => Ok(Some(SessionEvent::text_delta(delta))),
            StreamEvent::ThinkingDelta { delta, .. } if delta.is_empty() => Ok(None),
            StreamEvent::ThinkingDelta { index, delta } => {
                self.streamed_thinking.insert(index);
                Ok(Some(SessionEvent::thinking_delta(delta)))
            }
            StreamEvent::BlockComplete { index, block } => {
                if self.blocks.contains_key(&index) {
                    return Err(RuntimeError::Stream(format!(
                        "block {} completed twice",
                        index
                    )));
                }
                let (block, display) = match block {
                    ResponseBlock::Text { text } if text.is_empty() => (None, None),
                    ResponseBlock::Text { text } => (Some(ContentBlock::Text { text }), None),
                    ResponseBlock::ToolUse { id, name, input } => {
                        (Some(ContentBlock::ToolUse { id, name, input }), None)
                    }
                    ResponseBlock::Thinking {
                        thinking,
                        signature,
                    } => {
                        let display = (!self.streamed_thinking.contains(&index))
                            .then(|| SessionEvent::thinking(thinking.clone()));
                        (
                            Some(ContentBlock::Thinking {
                                text: thinking,
                                signature,
                            }),
                            display,
                        )
                    }
                };
                // Dropped blocks keep their slot so a repeated index is still caught.
                self.blocks.insert(index, block);
                Ok(display)
            }
            StreamEvent::Finish { usage, stop_reason } => {
                self.usage = Some(usage);
                self.stop_reason = stop_reason;
                Ok(None)
            }
            StreamEvent::Error { message } => Err(RuntimeError::Transport(message)),
        }
    }

    /// The assembled blocks in stream order, plus the reported usage.
    pub(crate) fn finish(self) -> (Vec<ContentBlock>, Option<Usage>, Option<FinishReason>) {
        let blocks = self.blocks.into_values().flatten().collect();
        (blocks, self.usage, self.stop_reason)
    }
}

impl Runtime {
    /// Send `request` and drain the response stream.
    ///
    /// Text fragments are forwarded to the display sink as they arrive. Any
    /// failure discards everything assembled so far.
    pub(super) async fn stream_response(
        &mut self,
        request: GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentBlock>, RuntimeError> {
        let start = Instant::now();

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RuntimeError::Cancelled),
            opened = self.provider.stream(request) => opened?,
        };

        let mut assembler = StreamAssembler::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RuntimeError::Cancelled),
                ev = stream.next() => ev,
            };
            let Some(event) = next else {
                break;
            };
            if let Some(display) = assembler.push(event?)? {
                let _ = self.event_tx.send(display).await;
            }
        }

        record_duration("duration_ms", start.elapsed());
        let (blocks, usage, stop_reason) = assembler.finish();

        if let Some(usage) = usage {
            let step_usage = TokenUsage::new(usage.input_tokens, usage.output_tokens)
                .with_cache(usage.cache_read_input_tokens, usage.cache_creation_input_tokens);
            self.usage.add(&step_usage);
            info!(
                input_tokens = step_usage.input_tokens,
                output_tokens = step_usage.output_tokens,
                cache_read_tokens = step_usage.cache_read_tokens,
                cache_write_tokens = step_usage.cache_write_tokens,
                "Response complete"
            );
        }
        if stop_reason == Some(FinishReason::MaxTokens) {
            warn!(max_tokens = self.config.max_tokens, "Response truncated at max_tokens");
        }

        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blocks_ordered_by_index() {
        let mut assembler = StreamAssembler::new();
        assembler
            .push(StreamEvent::block_complete(
                1,
                ResponseBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "bash".to_string(),
                    input: json!({"command": "ls"}),
                },
            ))
            .unwrap();
        assembler
            .push(StreamEvent::block_complete(
                0,
                ResponseBlock::Text {
                    text: "Running ls.".to_string(),
                },
            ))
            .unwrap();

        let (blocks, usage, _) = assembler.finish();
        assert!(usage.is_none());
        assert_eq!(blocks[0], ContentBlock::text("Running ls."));
        assert!(blocks[1].is_tool_use());
    }

    #[test]
    fn test_text_delta_forwarded_immediately() {
        let mut assembler = StreamAssembler::new();
        let display = assembler.push(StreamEvent::text_delta(0, "Hel")).unwrap();
        assert_eq!(display, Some(SessionEvent::text_delta("Hel")));
    }

    #[test]
    fn test_thinking_streamed_once() {
        let mut assembler = StreamAssembler::new();
        assert_eq!(
            assembler.push(StreamEvent::thinking_delta(0, "consider")).unwrap(),
            Some(SessionEvent::thinking_delta("consider"))
        );
        assert!(assembler.push(StreamEvent::thinking_delta(0, "")).unwrap().is_none());
        assert_eq!(
            assembler.push(StreamEvent::thinking_delta(0, " ls")).unwrap(),
            Some(SessionEvent::thinking_delta(" ls"))
        );

        let display = assembler
            .push(StreamEvent::block_complete(
                0,
                ResponseBlock::Thinking {
                    thinking: "consider ls".to_string(),
                    signature: Some("sig".to_string()),
                },
            ))
            .unwrap();
        assert!(display.is_none());

        let (blocks, _, _) = assembler.finish();
        assert_eq!(
            blocks,
            vec![ContentBlock::Thinking {
                text: "consider ls".to_string(),
                signature: Some("sig".to_string()),
            }]
        );
    }

    #[test]
    fn test_empty_text_dropped() {
        let mut assembler = StreamAssembler::new();
        assembler
            .push(StreamEvent::block_complete(
                0,
                ResponseBlock::Text {
                    text: String::new(),
                },
            ))
            .unwrap();
        let (blocks, _, _) = assembler.finish();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_duplicate_index_is_malformed() {
        let mut assembler = StreamAssembler::new();
        let text = ResponseBlock::Text {
            text: "a".to_string(),
        };
        assembler
            .push(StreamEvent::block_complete(0, text.clone()))
            .unwrap();
        let err = assembler
            .push(StreamEvent::block_complete(0, text))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Stream(_)));
    }

    #[test]
    fn test_thinking_displayed_and_kept_with_signature() {
        let mut assembler = StreamAssembler::new();
        let display = assembler
            .push(StreamEvent::block_complete(
                0,
                ResponseBlock::Thinking {
                    thinking: "consider ls".to_string(),
                    signature: Some("sig".to_string()),
                },
            ))
            .unwrap();
        assert_eq!(display, Some(SessionEvent::thinking("consider ls")));

        let (blocks, _, _) = assembler.finish();
        assert_eq!(
            blocks,
            vec![ContentBlock::Thinking {
                text: "consider ls".to_string(),
                signature: Some("sig".to_string()),
            }]
        );
    }

    #[test]
    fn test_finish_records_usage_and_error_aborts() {
        let mut assembler = StreamAssembler::new();
        assembler
            .push(StreamEvent::finish(
                Usage::new(10, 5),
                Some(FinishReason::EndTurn),
            ))
            .unwrap();
        assert!(matches!(
            assembler.push(StreamEvent::error("overloaded_error: Overloaded")),
            Err(RuntimeError::Transport(msg)) if msg.contains("Overloaded")
        ));

        let (_, usage, stop_reason) = assembler.finish();
        assert_eq!(usage, Some(Usage::new(10, 5)));
        assert_eq!(stop_reason, Some(FinishReason::EndTurn));
    }
}
