//! Span macros and helpers shared by the runtime crates

/// Create a span for one step of the turn loop
///
/// `error` and `duration_ms` are declared empty so [`record_error`] and
/// [`record_duration`] can fill them in.
///
/// # Example
///
/// ```rust
/// use tern_observability::turn_span;
///
/// let span = turn_span!("session-1", 0u32);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! turn_span {
    ($session_id:expr, $step:expr) => {
        tracing::info_span!(
            "turn.step",
            session.id = %$session_id,
            turn.step = $step,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Create a span for a single tool invocation
///
/// # Example
///
/// ```rust
/// use tern_observability::tool_span;
///
/// let span = tool_span!("bash", "toolu_01");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! tool_span {
    ($tool_name:expr, $tool_use_id:expr) => {
        tracing::info_span!(
            "tool.call",
            tool.name = %$tool_name,
            tool.use_id = %$tool_use_id,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Record an error on the current span and log it
pub fn record_error<E: std::fmt::Display + ?Sized>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}

/// Record latency/duration on the current span
///
/// # Example
///
/// ```rust
/// use tern_observability::record_duration;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// record_duration("duration_ms", start.elapsed());
/// ```
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_turn_span_records_fields() {
        let span = crate::turn_span!("session-1", 3u32);
        let _guard = span.enter();
        record_duration("duration_ms", Duration::from_millis(12));
        record_error(&"stream closed");
    }

    #[test]
    fn test_tool_span_builds() {
        let span = crate::tool_span!("bash", "toolu_1");
        let _guard = span.enter();
        record_duration("duration_ms", Duration::from_millis(1));
    }
}
