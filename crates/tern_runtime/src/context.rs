//! Transcript → request conversion.

use tern_core::{ContentBlock, Message, Role, ToolResultContent, Transcript};
use tern_llms::{
    CacheControl, ContentPart, GenerateRequest, Message as LlmMessage, Role as LlmRole,
    ToolDefinition, ToolResultPart,
};
use tern_toolbus::ToolBus;

use crate::cache;
use crate::config::RuntimeConfig;

/// The tool-parameter list offered on every request.
pub fn tool_definitions(toolbus: &ToolBus) -> Vec<ToolDefinition> {
    toolbus
        .list_tools()
        .into_iter()
        .map(|info| {
            let definition = ToolDefinition::custom(info.name, info.description, info.parameters);
            match info.api_type {
                Some(api_type) => definition.with_api_type(api_type),
                None => definition,
            }
        })
        .collect()
}

/// Build the request for the transcript as currently annotated.
pub fn build_request(
    config: &RuntimeConfig,
    transcript: &Transcript,
    tools: &[ToolDefinition],
) -> GenerateRequest {
    GenerateRequest::new(config.model.clone(), config.max_tokens)
        .with_system(cache::system_blocks(&config.system_prompt))
        .with_messages(transcript.messages().iter().map(to_llm_message).collect())
        .with_tools(tools.to_vec())
        .with_betas(config.feature_flags())
}

pub fn to_llm_message(message: &Message) -> LlmMessage {
    let role = match message.role {
        Role::User => LlmRole::User,
        Role::Assistant => LlmRole::Assistant,
    };
    let llm = LlmMessage::new(role, message.content.iter().map(to_content_part).collect());
    if message.cache_breakpoint {
        llm.with_cache_control(CacheControl::Ephemeral)
    } else {
        llm
    }
}

fn to_content_part(block: &ContentBlock) -> ContentPart {
    match block {
        ContentBlock::Text { text } => ContentPart::text(text.clone()),
        ContentBlock::ToolUse { id, name, input } => ContentPart::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ContentPart::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: content.iter().map(to_result_part).collect(),
            is_error: *is_error,
        },
        ContentBlock::Thinking { text, signature } => ContentPart::Thinking {
            thinking: text.clone(),
            signature: signature.clone(),
        },
    }
}

fn to_result_part(content: &ToolResultContent) -> ToolResultPart {
    match content {
        ToolResultContent::Text { text } => ToolResultPart::Text { text: text.clone() },
        ToolResultContent::Image { source } => ToolResultPart::Image {
            media_type: source.media_type.clone(),
            data: source.data.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tern_core::ToolOutcome;
    use tern_toolbus::Bash;

    #[test]
    fn test_request_carries_config_and_transcript() {
        let config = RuntimeConfig::new().with_model("claude-test").with_max_tokens(512);
        let mut transcript = Transcript::new();
        transcript.push(Message::user_text("list files"));
        cache::annotate(&mut transcript, 2);

        let request = build_request(&config, &transcript, &[]);

        assert_eq!(request.model, "claude-test");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.system[0].cache_control, Some(CacheControl::Ephemeral));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].cache_control, Some(CacheControl::Ephemeral));
        assert_eq!(
            request.betas,
            vec!["computer-use-2025-01-24", "prompt-caching-2024-07-31"]
        );
    }

    #[test]
    fn test_message_conversion_preserves_blocks() {
        let message = Message::assistant(vec![
            ContentBlock::Thinking {
                text: "hmm".to_string(),
                signature: Some("sig".to_string()),
            },
            ContentBlock::tool_use("toolu_1", "bash", json!({"command": "ls"})),
        ]);
        let llm = to_llm_message(&message);

        assert_eq!(llm.role, LlmRole::Assistant);
        assert!(llm.cache_control.is_none());
        assert_eq!(
            llm.content,
            vec![
                ContentPart::Thinking {
                    thinking: "hmm".to_string(),
                    signature: Some("sig".to_string()),
                },
                ContentPart::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "bash".to_string(),
                    input: json!({"command": "ls"}),
                },
            ]
        );
    }

    #[test]
    fn test_tool_result_image_conversion() {
        let block = ToolOutcome::success("shot").with_image("aGVsbG8=").into_result_block("t1");
        let ContentPart::ToolResult { content, .. } = to_content_part(&block) else {
            panic!("expected tool result");
        };
        assert_eq!(
            content[1],
            ToolResultPart::Image {
                media_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            }
        );
    }

    #[test]
    fn test_tool_definitions_follow_api_type() {
        let mut bus = ToolBus::empty(PathBuf::from("/tmp"));
        bus.register(Bash::new().with_api_type(Some("bash_20250124")));
        let defs = tool_definitions(&bus);
        assert_eq!(defs[0].api_type.as_deref(), Some("bash_20250124"));

        let plain = tool_definitions(&ToolBus::new(PathBuf::from("/tmp")));
        assert!(plain[0].api_type.is_none());
        assert_eq!(plain[0].input_schema["type"], "object");
    }
}
