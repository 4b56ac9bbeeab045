mod args;
mod error;
mod executor;

pub use args::BashArgs;
pub use error::BashError;
pub use executor::BashExecutor;

use crate::tools::{parse_tool_schema, Tool, ToolResult, ToolSchema};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::OnceLock;

fn schema() -> &'static ToolSchema {
    static SCHEMA: OnceLock<ToolSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| parse_tool_schema(include_str!("schema.json")))
}

pub struct Bash {
    executor: BashExecutor,
    api_type: Option<String>,
}

impl Bash {
    pub fn new() -> Self {
        Self {
            executor: BashExecutor::default(),
            api_type: None,
        }
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.executor = self.executor.with_working_dir(working_dir);
        self
    }

    /// Advertise the tool as a remote-defined type (e.g. `bash_20250124`)
    /// instead of sending the JSON schema.
    pub fn with_api_type(mut self, api_type: Option<impl Into<String>>) -> Self {
        self.api_type = api_type.map(Into::into);
        self
    }
}

impl Default for Bash {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Bash {
    fn name(&self) -> &str {
        &schema().name
    }

    fn description(&self) -> &str {
        &schema().description
    }

    fn parameters_schema(&self) -> JsonValue {
        schema().parameters.clone()
    }

    fn api_type(&self) -> Option<&str> {
        self.api_type.as_deref()
    }

    async fn execute(&self, args: JsonValue) -> ToolResult {
        let bash_args: BashArgs = serde_json::from_value(args)?;
        let output = self.executor.run(&bash_args).await?;
        Ok(output.into_outcome())
    }
}
