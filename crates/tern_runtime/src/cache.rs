//! Cache breakpoint annotation.
//!
//! Before each request the most recent user messages are flagged as cache
//! breakpoints so the service can reuse the prompt prefix up to them. The
//! system block is marked separately on every request (see [`system_blocks`]).

use tern_core::{Role, Transcript};
use tern_llms::{CacheControl, SystemBlock};

/// Flag up to `max` of the newest non-empty user messages and clear the flag on
/// every other message. Returns the number of messages flagged.
pub fn annotate(transcript: &mut Transcript, max: usize) -> usize {
    let mut remaining = max;
    for message in transcript.iter_mut().rev() {
        let eligible = message.role == Role::User && !message.content.is_empty();
        message.cache_breakpoint = eligible && remaining > 0;
        if message.cache_breakpoint {
            remaining -= 1;
        }
    }
    max - remaining
}

/// The system prompt as a single cacheable block.
pub fn system_blocks(system_prompt: &str) -> Vec<SystemBlock> {
    vec![SystemBlock::new(system_prompt).with_cache_control(CacheControl::Ephemeral)]
}
