//! Tool dispatch.

use std::time::Instant;

use tern_core::{ContentBlock, SessionEvent};
use tern_observability::{record_duration, tool_span};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

use crate::error::RuntimeError;

use super::Runtime;

impl Runtime {
    /// Invoke every `ToolUse` in `blocks`, one at a time and in order.
    ///
    /// Tool failures become error results rather than errors; only
    /// cancellation ends dispatch early, in which case nothing is returned.
    pub(super) async fn dispatch_tools(
        &self,
        blocks: &[ContentBlock],
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentBlock>, RuntimeError> {
        let mut results = Vec::new();

        for block in blocks {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let span = tool_span!(name, id);
            info!(tool = %name, tool_use_id = %id, "Dispatching tool");
            let _ = self
                .event_tx
                .send(SessionEvent::tool_start(id.clone(), name.clone(), input.clone()))
                .await;

            let start = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RuntimeError::Cancelled),
                outcome = self.toolbus.dispatch(name, input.clone()).instrument(span.clone()) => outcome,
            };

            span.in_scope(|| {
                record_duration("duration_ms", start.elapsed());
                if let Some(error) = outcome.error.as_deref().filter(|e| !e.is_empty()) {
                    span.record("error", true);
                    span.record("error.message", error);
                    debug!(error = %error, "Tool reported an error");
                }
            });

            let _ = self
                .event_tx
                .send(SessionEvent::tool_done(id.clone(), outcome.clone()))
                .await;
            results.push(outcome.into_result_block(id.clone()));
        }

        Ok(results)
    }
}
