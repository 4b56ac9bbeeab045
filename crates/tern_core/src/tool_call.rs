use serde::{Deserialize, Serialize};

use crate::message::{ContentBlock, ToolResultContent};

/// Raw outcome of a tool invocation, before it becomes a `ToolResult` block.
///
/// `error` and `output`/`base64_image` may coexist here; the conversion decides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_image: Option<String>,
}

impl ToolOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_image(mut self, base64_png: impl Into<String>) -> Self {
        self.base64_image = Some(base64_png.into());
        self
    }

    /// An empty error string counts as no error.
    pub fn is_failure(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Convert into the `ToolResult` block answering `tool_use_id`.
    ///
    /// An error replaces any output or image: the block carries exactly the error text.
    pub fn into_result_block(self, tool_use_id: impl Into<String>) -> ContentBlock {
        let tool_use_id = tool_use_id.into();

        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return ContentBlock::ToolResult {
                tool_use_id,
                content: vec![ToolResultContent::text(error)],
                is_error: true,
            };
        }

        let mut content = Vec::new();
        if let Some(output) = self.output.filter(|o| !o.is_empty()) {
            content.push(ToolResultContent::text(output));
        }
        if let Some(image) = self.base64_image.filter(|i| !i.is_empty()) {
            content.push(ToolResultContent::png(image));
        }

        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: false,
        }
    }
}
