pub mod bash;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tern_core::ToolOutcome;

pub use bash::{Bash, BashArgs, BashError, BashExecutor};

pub type ToolResult = anyhow::Result<ToolOutcome>;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> JsonValue;

    /// Remote-defined tool type, when the service already knows this tool's schema.
    fn api_type(&self) -> Option<&str> {
        None
    }

    async fn execute(&self, args: JsonValue) -> ToolResult;
}

/// Name, description and JSON schema of a tool, as embedded in its `schema.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: JsonValue,
}

/// Parse an embedded tool schema. Malformed input yields an empty schema,
/// which the schema tests for each tool catch.
pub fn parse_tool_schema(raw: &str) -> ToolSchema {
    match serde_json::from_str(raw) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::error!(error = %e, "invalid embedded tool schema");
            ToolSchema::default()
        }
    }
}

/// Captured result of running an external process.
#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl ToolOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Zero exit: stdout, followed by stderr when there is any.
    /// Non-zero exit: stdout as output and `exit code N: <stderr>` as the error.
    pub fn into_outcome(self) -> ToolOutcome {
        if self.is_success() {
            let mut output = self.stdout;
            if !self.stderr.is_empty() {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&self.stderr);
            }
            return ToolOutcome::success(output);
        }

        let error = format!("exit code {}: {}", self.exit_code, self.stderr.trim_end());
        let outcome = ToolOutcome::failure(error);
        if self.stdout.is_empty() {
            outcome
        } else {
            outcome.with_output(self.stdout)
        }
    }
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(tern_constant::defaults::BASH_TIMEOUT_SECS)
}
