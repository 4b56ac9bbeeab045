//! Anthropic streaming support
//!
//! The Messages API streams named SSE events whose `data` carries a `type` tag:
//! - `message_start` with the message id and input usage
//! - `content_block_start` / `content_block_delta` / `content_block_stop` per block
//! - `message_delta` with the stop reason and output usage
//! - `message_stop` to signal the end of the response
//! - `ping` keep-alives and `error` reports

use std::collections::{HashMap, HashSet};

use super::types::{AnthropicStreamEvent, AnthropicUsage, BlockDelta, StartBlock};
use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerateStream, ResponseBlock, StreamEvent, Usage};
use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};

/// A content block that has been opened but not yet stopped.
#[derive(Debug)]
enum PartialBlock {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        initial_input: serde_json::Value,
        partial_json: String,
    },
    Thinking {
        thinking: String,
        signature: Option<String>,
    },
}

/// Accumulated state across the events of one response.
#[derive(Debug, Default)]
pub struct StreamState {
    open: HashMap<usize, PartialBlock>,
    /// Blocks of a kind this client does not handle; their events are skipped.
    ignored: HashSet<usize>,
    usage: Usage,
    stop_reason: Option<FinishReason>,
    finished: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `message_stop` has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn merge_usage(&mut self, usage: &AnthropicUsage) {
        if let Some(n) = usage.input_tokens {
            self.usage.input_tokens = n;
        }
        if let Some(n) = usage.output_tokens {
            self.usage.output_tokens = n;
        }
        if let Some(n) = usage.cache_creation_input_tokens {
            self.usage.cache_creation_input_tokens = n;
        }
        if let Some(n) = usage.cache_read_input_tokens {
            self.usage.cache_read_input_tokens = n;
        }
    }
}

/// Create a stream from an Anthropic EventSource
pub async fn create_stream(mut event_source: EventSource) -> Result<GenerateStream> {
    let stream = async_stream::stream! {
        let mut state = StreamState::new();
        let mut failed = false;

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => {
                    match parse_event(&message.data).and_then(|e| process_event(e, &mut state)) {
                        Ok(events) => {
                            for stream_event in events {
                                let is_error = matches!(stream_event, StreamEvent::Error { .. });
                                yield Ok(stream_event);
                                if is_error {
                                    failed = true;
                                }
                            }
                            if failed || state.is_finished() {
                                break;
                            }
                        }
                        Err(e) => {
                            failed = true;
                            yield Err(e);
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    failed = true;
                    yield Err(Error::provider_error(format!(
                        "Anthropic API error {}: {}", status, error_body
                    )));
                    break;
                }
                Err(e) => {
                    failed = true;
                    yield Err(Error::stream_error(format!("Stream error: {}", e)));
                    break;
                }
            }
        }

        event_source.close();

        if !failed && !state.is_finished() {
            yield Err(Error::stream_error("stream ended before message_stop"));
        }
    };

    Ok(GenerateStream::new(Box::pin(stream)))
}

pub fn parse_event(data: &str) -> Result<AnthropicStreamEvent> {
    serde_json::from_str(data)
        .map_err(|e| Error::stream_error(format!("Failed to parse Anthropic event: {}", e)))
}

/// Advance `state` by one server event, returning the unified events it produces.
///
/// Deltas or stops for a block that was never opened, and tool input that does
/// not parse as JSON, are stream errors.
pub fn process_event(
    event: AnthropicStreamEvent,
    state: &mut StreamState,
) -> Result<Vec<StreamEvent>> {
    let mut events = Vec::new();

    match event {
        AnthropicStreamEvent::MessageStart { message } => {
            if let Some(ref usage) = message.usage {
                state.merge_usage(usage);
            }
            events.push(StreamEvent::start(message.id));
        }

        AnthropicStreamEvent::ContentBlockStart {
            index,
            content_block,
        } => {
            if state.open.contains_key(&index) {
                return Err(Error::stream_error(format!(
                    "content block {} started twice",
                    index
                )));
            }
            let block = match content_block {
                StartBlock::Text { text } => PartialBlock::Text(text),
                StartBlock::ToolUse { id, name, input } => PartialBlock::ToolUse {
                    id,
                    name,
                    initial_input: input,
                    partial_json: String::new(),
                },
                StartBlock::Thinking {
                    thinking,
                    signature,
                } => PartialBlock::Thinking {
                    thinking,
                    signature,
                },
                StartBlock::Unknown => {
                    state.ignored.insert(index);
                    return Ok(events);
                }
            };
            state.open.insert(index, block);
        }

        AnthropicStreamEvent::ContentBlockDelta { index, delta } => {
            if state.ignored.contains(&index) {
                return Ok(events);
            }
            let block = state.open.get_mut(&index).ok_or_else(|| {
                Error::stream_error(format!("delta for unopened content block {}", index))
            })?;

            match (block, delta) {
                (PartialBlock::Text(text), BlockDelta::TextDelta { text: delta }) => {
                    text.push_str(&delta);
                    events.push(StreamEvent::text_delta(index, delta));
                }
                (
                    PartialBlock::ToolUse { partial_json, .. },
                    BlockDelta::InputJsonDelta {
                        partial_json: delta,
                    },
                ) => {
                    partial_json.push_str(&delta);
                }
                (PartialBlock::Thinking { thinking, .. }, BlockDelta::ThinkingDelta { thinking: delta }) => {
                    thinking.push_str(&delta);
                    events.push(StreamEvent::thinking_delta(index, delta));
                }
                (
                    PartialBlock::Thinking { signature, .. },
                    BlockDelta::SignatureDelta { signature: delta },
                ) => {
                    signature.get_or_insert_with(String::new).push_str(&delta);
                }
                (_, BlockDelta::Unknown) => {}
                (_, _) => {
                    return Err(Error::stream_error(format!(
                        "delta does not match the kind of content block {}",
                        index
                    )));
                }
            }
        }

        AnthropicStreamEvent::ContentBlockStop { index } => {
            if state.ignored.remove(&index) {
                return Ok(events);
            }
            let block = state.open.remove(&index).ok_or_else(|| {
                Error::stream_error(format!("stop for unopened content block {}", index))
            })?;
            events.push(StreamEvent::block_complete(index, finish_block(block)?));
        }

        AnthropicStreamEvent::MessageDelta { delta, usage } => {
            if let Some(ref usage) = usage {
                state.merge_usage(usage);
            }
            if let Some(reason) = delta.stop_reason {
                state.stop_reason = Some(FinishReason::parse(&reason));
            }
        }

        AnthropicStreamEvent::MessageStop => {
            if !state.open.is_empty() {
                return Err(Error::stream_error(format!(
                    "message stopped with {} content block(s) still open",
                    state.open.len()
                )));
            }
            state.finished = true;
            events.push(StreamEvent::finish(state.usage, state.stop_reason.take()));
        }

        AnthropicStreamEvent::Error { error } => {
            events.push(StreamEvent::error(format!("{}: {}", error.kind, error.message)));
        }

        AnthropicStreamEvent::Ping | AnthropicStreamEvent::Unknown => {}
    }

    Ok(events)
}

fn finish_block(block: PartialBlock) -> Result<ResponseBlock> {
    Ok(match block {
        PartialBlock::Text(text) => ResponseBlock::Text { text },
        PartialBlock::ToolUse {
            id,
            name,
            initial_input,
            partial_json,
        } => {
            let input = if partial_json.trim().is_empty() {
                if initial_input.is_null() {
                    serde_json::json!({})
                } else {
                    initial_input
                }
            } else {
                serde_json::from_str(&partial_json).map_err(|e| {
                    Error::stream_error(format!("invalid input JSON for tool {}: {}", name, e))
                })?
            };
            ResponseBlock::ToolUse { id, name, input }
        }
        PartialBlock::Thinking {
            thinking,
            signature,
        } => ResponseBlock::Thinking {
            thinking,
            signature,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(state: &mut StreamState, data: serde_json::Value) -> Result<Vec<StreamEvent>> {
        process_event(parse_event(&data.to_string())?, state)
    }

    fn feed_ok(state: &mut StreamState, data: serde_json::Value) -> Vec<StreamEvent> {
        feed(state, data).unwrap()
    }

    #[test]
    fn test_text_response() {
        let mut state = StreamState::new();

        let events = feed_ok(
            &mut state,
            json!({"type": "message_start", "message": {"id": "msg_1", "usage": {"input_tokens": 12, "cache_read_input_tokens": 8}}}),
        );
        assert_eq!(events, vec![StreamEvent::start("msg_1")]);

        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}));
        let events = feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hel"}}));
        assert_eq!(events, vec![StreamEvent::text_delta(0, "Hel")]);
        feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "lo"}}));

        let events = feed_ok(&mut state, json!({"type": "content_block_stop", "index": 0}));
        assert_eq!(
            events,
            vec![StreamEvent::block_complete(0, ResponseBlock::Text { text: "Hello".to_string() })]
        );

        feed_ok(&mut state, json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 5}}));
        let events = feed_ok(&mut state, json!({"type": "message_stop"}));

        let mut usage = Usage::new(12, 5);
        usage.cache_read_input_tokens = 8;
        assert_eq!(events, vec![StreamEvent::finish(usage, Some(FinishReason::EndTurn))]);
        assert!(state.is_finished());
    }

    #[test]
    fn test_tool_use_accumulates_partial_json() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 1, "content_block": {"type": "tool_use", "id": "toolu_1", "name": "bash", "input": {}}}));

        let events = feed_ok(&mut state, json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "{\"comm"}}));
        assert!(events.is_empty());
        feed_ok(&mut state, json!({"type": "content_block_delta", "index": 1, "delta": {"type": "input_json_delta", "partial_json": "and\": \"ls\"}"}}));

        let events = feed_ok(&mut state, json!({"type": "content_block_stop", "index": 1}));
        assert_eq!(
            events,
            vec![StreamEvent::block_complete(
                1,
                ResponseBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "bash".to_string(),
                    input: json!({"command": "ls"}),
                }
            )]
        );
    }

    #[test]
    fn test_tool_use_without_deltas_keeps_initial_input() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "toolu_2", "name": "noop", "input": {}}}));
        let events = feed_ok(&mut state, json!({"type": "content_block_stop", "index": 0}));
        let StreamEvent::BlockComplete { block: ResponseBlock::ToolUse { input, .. }, .. } = &events[0] else {
            panic!("expected tool use");
        };
        assert_eq!(input, &json!({}));
    }

    #[test]
    fn test_invalid_tool_json_is_error() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "toolu_3", "name": "bash", "input": {}}}));
        feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "input_json_delta", "partial_json": "{\"command\": "}}));

        let err = feed(&mut state, json!({"type": "content_block_stop", "index": 0})).unwrap_err();
        assert!(matches!(err, Error::Stream(msg) if msg.contains("invalid input JSON")));
    }

    #[test]
    fn test_thinking_with_signature() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "thinking", "thinking": ""}}));
        let events = feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "thinking_delta", "thinking": "ponder"}}));
        assert_eq!(events, vec![StreamEvent::thinking_delta(0, "ponder")]);
        feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "signature_delta", "signature": "EqQB"}}));

        let events = feed_ok(&mut state, json!({"type": "content_block_stop", "index": 0}));
        assert_eq!(
            events,
            vec![StreamEvent::block_complete(
                0,
                ResponseBlock::Thinking {
                    thinking: "ponder".to_string(),
                    signature: Some("EqQB".to_string()),
                }
            )]
        );
    }

    #[test]
    fn test_delta_for_unopened_block_is_error() {
        let mut state = StreamState::new();
        let err = feed(&mut state, json!({"type": "content_block_delta", "index": 3, "delta": {"type": "text_delta", "text": "x"}})).unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
    }

    #[test]
    fn test_stop_for_unopened_block_is_error() {
        let mut state = StreamState::new();
        assert!(feed(&mut state, json!({"type": "content_block_stop", "index": 0})).is_err());
    }

    #[test]
    fn test_mismatched_delta_is_error() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}));
        let result = feed(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "input_json_delta", "partial_json": "{}"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_block_kind_is_ignored() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "redacted_thinking", "data": "xyz"}}));
        assert!(feed_ok(&mut state, json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "x"}})).is_empty());
        assert!(feed_ok(&mut state, json!({"type": "content_block_stop", "index": 0})).is_empty());
        feed_ok(&mut state, json!({"type": "message_stop"}));
        assert!(state.is_finished());
    }

    #[test]
    fn test_ping_and_unknown_events_ignored() {
        let mut state = StreamState::new();
        assert!(feed_ok(&mut state, json!({"type": "ping"})).is_empty());
        assert!(feed_ok(&mut state, json!({"type": "some_future_event", "x": 1})).is_empty());
    }

    #[test]
    fn test_error_event() {
        let mut state = StreamState::new();
        let events = feed_ok(
            &mut state,
            json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
        );
        assert_eq!(events, vec![StreamEvent::error("overloaded_error: Overloaded")]);
    }

    #[test]
    fn test_message_stop_with_open_block_is_error() {
        let mut state = StreamState::new();
        feed_ok(&mut state, json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}));
        assert!(feed(&mut state, json!({"type": "message_stop"})).is_err());
    }

    #[test]
    fn test_unparsable_event_is_error() {
        let err = parse_event("{not json").unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
    }
}
