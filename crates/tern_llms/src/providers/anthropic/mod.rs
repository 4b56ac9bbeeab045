//! Anthropic provider module
//!
//! Implements the Provider trait for the Anthropic Messages API with streaming.
//! API docs: https://docs.anthropic.com/en/api/messages-streaming

mod convert;
mod provider;
mod stream;
mod types;

pub use provider::AnthropicProvider;
pub use stream::{process_event, parse_event, StreamState};
pub use types::{AnthropicConfig, AnthropicRequest, AnthropicStreamEvent};
