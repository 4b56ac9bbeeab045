use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of an inline image inside a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContent {
    Text { text: String },
    Image { source: ImageSource },
}

impl ToolResultContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolResultContent::Text { text: text.into() }
    }

    /// A base64-encoded PNG, the only image format tools produce.
    pub fn png(data: impl Into<String>) -> Self {
        ToolResultContent::Image {
            source: ImageSource {
                kind: "base64".to_string(),
                media_type: "image/png".to_string(),
                data: data.into(),
            },
        }
    }
}

/// The atomic unit of a message.
///
/// Serialized with a `type` tag matching the remote service's block shapes, which is
/// also the shape used by saved transcripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default, deserialize_with = "deserialize_result_content")]
        content: Vec<ToolResultContent>,
        #[serde(default)]
        is_error: bool,
    },
    /// Reasoning trace. Display-only; never handed to a tool.
    Thinking {
        #[serde(rename = "thinking")]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
}

impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        ContentBlock::Text {
            text: content.into(),
        }
    }

    pub fn thinking(content: impl Into<String>) -> Self {
        ContentBlock::Thinking {
            text: content.into(),
            signature: None,
        }
    }

    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

/// Tool results written by older clients carry a bare string instead of a part list.
fn deserialize_result_content<'de, D>(deserializer: D) -> Result<Vec<ToolResultContent>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bare(String),
        Parts(Vec<ToolResultContent>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bare(text) => vec![ToolResultContent::text(text)],
        Raw::Parts(parts) => parts,
    })
}

/// One transcript entry: a role plus its ordered blocks.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
    /// Request-time cache annotation; not part of the message's value.
    pub cache_breakpoint: bool,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content,
            cache_breakpoint: false,
        }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::text(text)])
    }

    pub fn has_tool_use(&self) -> bool {
        self.content.iter().any(ContentBlock::is_tool_use)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.content == other.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        let err = "system".parse::<Role>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownRole(r) if r == "system"));
    }

    #[test]
    fn test_text_block_shape() {
        let json = serde_json::to_value(ContentBlock::text("hi")).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn test_tool_use_block_shape() {
        let block = ContentBlock::tool_use("toolu_1", "bash", json!({"command": "ls"}));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            json!({"type": "tool_use", "id": "toolu_1", "name": "bash", "input": {"command": "ls"}})
        );
    }

    #[test]
    fn test_thinking_block_uses_wire_field_name() {
        let json = serde_json::to_value(ContentBlock::thinking("hmm")).unwrap();
        assert_eq!(json, json!({"type": "thinking", "thinking": "hmm"}));
    }

    #[test]
    fn test_tool_result_accepts_bare_string_content() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "tool_result",
            "tool_use_id": "toolu_1",
            "content": "permission denied",
            "is_error": true
        }))
        .unwrap();

        assert_eq!(
            block,
            ContentBlock::ToolResult {
                tool_use_id: "toolu_1".to_string(),
                content: vec![ToolResultContent::text("permission denied")],
                is_error: true,
            }
        );
    }

    #[test]
    fn test_tool_result_image_part() {
        let json = serde_json::to_value(ToolResultContent::png("aGVsbG8=")).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "image",
                "source": {"type": "base64", "media_type": "image/png", "data": "aGVsbG8="}
            })
        );
    }

    #[test]
    fn test_message_equality_ignores_cache_breakpoint() {
        let plain = Message::user_text("hello");
        let mut marked = Message::user_text("hello");
        marked.cache_breakpoint = true;
        assert_eq!(plain, marked);
    }

    #[test]
    fn test_has_tool_use() {
        let msg = Message::assistant(vec![
            ContentBlock::text("running"),
            ContentBlock::tool_use("t1", "bash", json!({})),
        ]);
        assert!(msg.has_tool_use());
        assert!(!Message::user_text("no tools").has_tool_use());
    }
}
