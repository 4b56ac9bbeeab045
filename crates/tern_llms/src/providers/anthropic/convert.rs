//! Conversion from unified types to the Anthropic wire format

use super::types::*;
use crate::types::{CacheControl, ContentPart, GenerateRequest, Message, Role, ToolDefinition, ToolResultPart};

pub fn to_anthropic_request(request: &GenerateRequest) -> AnthropicRequest {
    AnthropicRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        system: request
            .system
            .iter()
            .map(|block| AnthropicSystemBlock {
                kind: "text",
                text: block.text.clone(),
                cache_control: block.cache_control.map(to_cache_control),
            })
            .collect(),
        messages: request
            .messages
            .iter()
            .filter_map(to_anthropic_message)
            .collect(),
        tools: request.tools.iter().map(to_anthropic_tool).collect(),
        stream: true,
    }
}

fn to_cache_control(cache_control: CacheControl) -> AnthropicCacheControl {
    match cache_control {
        CacheControl::Ephemeral => AnthropicCacheControl::ephemeral(),
    }
}

/// Messages left with no content are skipped; the service rejects them.
fn to_anthropic_message(message: &Message) -> Option<AnthropicMessage> {
    let mut content: Vec<AnthropicContentBlock> = message
        .content
        .iter()
        .filter_map(to_anthropic_content)
        .map(|kind| AnthropicContentBlock {
            kind,
            cache_control: None,
        })
        .collect();

    let last = content.last_mut()?;
    if let Some(cache_control) = message.cache_control {
        last.cache_control = Some(to_cache_control(cache_control));
    }

    Some(AnthropicMessage {
        role: match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content,
    })
}

/// Thinking without a signature cannot be replayed and is left out.
fn to_anthropic_content(part: &ContentPart) -> Option<AnthropicContent> {
    Some(match part {
        ContentPart::Text { text } => AnthropicContent::Text { text: text.clone() },
        ContentPart::ToolUse { id, name, input } => AnthropicContent::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        },
        ContentPart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => AnthropicContent::ToolResult {
            tool_use_id: tool_use_id.clone(),
            content: content.iter().map(to_tool_result_content).collect(),
            is_error: *is_error,
        },
        ContentPart::Thinking {
            thinking,
            signature,
        } => AnthropicContent::Thinking {
            thinking: thinking.clone(),
            signature: signature.clone()?,
        },
    })
}

fn to_tool_result_content(part: &ToolResultPart) -> AnthropicToolResultContent {
    match part {
        ToolResultPart::Text { text } => AnthropicToolResultContent::Text { text: text.clone() },
        ToolResultPart::Image { media_type, data } => AnthropicToolResultContent::Image {
            source: AnthropicImageSource {
                kind: "base64",
                media_type: media_type.clone(),
                data: data.clone(),
            },
        },
    }
}

fn to_anthropic_tool(tool: &ToolDefinition) -> AnthropicTool {
    match &tool.api_type {
        Some(kind) => AnthropicTool::Defined {
            kind: kind.clone(),
            name: tool.name.clone(),
        },
        None => AnthropicTool::Custom {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        },
    }
}
