use serde::{Deserialize, Serialize};

use crate::tool_call::ToolOutcome;

/// Progress notifications emitted while a turn runs.
///
/// Delivered in order to a single display sink. Every `TurnStart` is matched by a
/// `TurnEnd`; a failed step sends its `Error` just before the `TurnEnd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TurnStart { step: u32 },

    TextDelta { text: String },

    /// A reasoning fragment, forwarded as it streams.
    ThinkingDelta { text: String },

    /// A whole reasoning block whose fragments were never streamed.
    Thinking { thinking: String },

    ToolStart {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    ToolDone {
        tool_use_id: String,
        outcome: ToolOutcome,
    },

    Status { message: String },

    TurnEnd,

    Error { error: String },
}

impl SessionEvent {
    pub fn turn_start(step: u32) -> Self {
        SessionEvent::TurnStart { step }
    }

    pub fn text_delta(text: impl Into<String>) -> Self {
        SessionEvent::TextDelta { text: text.into() }
    }

    pub fn thinking_delta(text: impl Into<String>) -> Self {
        SessionEvent::ThinkingDelta { text: text.into() }
    }

    pub fn thinking(thinking: impl Into<String>) -> Self {
        SessionEvent::Thinking {
            thinking: thinking.into(),
        }
    }

    pub fn tool_start(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        SessionEvent::ToolStart {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_done(tool_use_id: impl Into<String>, outcome: ToolOutcome) -> Self {
        SessionEvent::ToolDone {
            tool_use_id: tool_use_id.into(),
            outcome,
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        SessionEvent::Status {
            message: message.into(),
        }
    }

    pub fn turn_end() -> Self {
        SessionEvent::TurnEnd
    }

    pub fn error(error: impl Into<String>) -> Self {
        SessionEvent::Error {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_start() {
        let json = serde_json::to_string(&SessionEvent::turn_start(2)).unwrap();
        assert!(json.contains(r#""type":"turn_start"#));
        assert!(json.contains(r#""step":2"#));
    }

    #[test]
    fn test_text_delta() {
        let json = serde_json::to_string(&SessionEvent::text_delta("hello world")).unwrap();
        assert!(json.contains(r#""type":"text_delta"#));
        assert!(json.contains("hello world"));
    }

    #[test]
    fn test_thinking() {
        let json = serde_json::to_string(&SessionEvent::thinking("let me think...")).unwrap();
        assert!(json.contains(r#""type":"thinking"#));
        assert!(json.contains("let me think..."));
    }

    #[test]
    fn test_thinking_delta() {
        let json = serde_json::to_string(&SessionEvent::thinking_delta("consider")).unwrap();
        assert!(json.contains(r#""type":"thinking_delta"#));
        assert!(json.contains("consider"));
    }

    #[test]
    fn test_tool_start() {
        let event = SessionEvent::tool_start("t1", "bash", serde_json::json!({"command": "ls"}));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_start"#));
        assert!(json.contains(r#""name":"bash"#));
    }

    #[test]
    fn test_tool_done() {
        let event = SessionEvent::tool_done("tool-1", ToolOutcome::failure("exit code 1: nope"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_done"#));
        assert!(json.contains("tool-1"));
        assert!(json.contains("exit code 1"));
    }

    #[test]
    fn test_status() {
        let json = serde_json::to_string(&SessionEvent::status("cancelled")).unwrap();
        assert!(json.contains(r#""type":"status"#));
        assert!(json.contains("cancelled"));
    }

    #[test]
    fn test_turn_end() {
        let json = serde_json::to_string(&SessionEvent::turn_end()).unwrap();
        assert_eq!(json, r#"{"type":"turn_end"}"#);
    }

    #[test]
    fn test_error() {
        let json = serde_json::to_string(&SessionEvent::error("stream closed")).unwrap();
        assert!(json.contains(r#""type":"error"#));
        assert!(json.contains("stream closed"));
    }

    #[test]
    fn test_roundtrip() {
        let event = SessionEvent::tool_done("toolu_9", ToolOutcome::success("done"));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
