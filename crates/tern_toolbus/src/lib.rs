pub mod tools;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use futures::FutureExt;
use serde_json::Value as JsonValue;
use tern_core::ToolOutcome;

pub use tools::{
    default_timeout, parse_tool_schema, Bash, BashArgs, BashError, BashExecutor, Tool,
    ToolOutput, ToolResult, ToolSchema,
};

/// Registry of the tools available to a session, keyed by name.
///
/// The set is fixed once the session starts; the runtime only reads from it.
pub struct ToolBus {
    working_dir: PathBuf,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolBus {
    /// A registry with the default `bash` tool rooted at `working_dir`.
    pub fn new(working_dir: PathBuf) -> Self {
        let mut bus = Self::empty(working_dir);
        bus.register_defaults();
        bus
    }

    pub fn empty(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            tools: HashMap::new(),
        }
    }

    fn register_defaults(&mut self) {
        let bash = Bash::new().with_working_dir(self.working_dir.clone());
        self.register(bash);
    }

    /// Register a tool, replacing any tool already registered under its name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn contains(&self, tool_name: &str) -> bool {
        self.tools.contains_key(tool_name)
    }

    /// Run a tool, returning its outcome and wall-clock duration in milliseconds.
    pub async fn call(&self, tool_name: &str, args: JsonValue) -> Result<(ToolOutcome, u64)> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| anyhow!("Tool {} is invalid", tool_name))?;

        let start = Instant::now();
        let outcome = tool.execute(args).await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        Ok((outcome, duration_ms))
    }

    /// Run a tool and fold every failure into the outcome.
    ///
    /// Unknown names, `Err` returns and panics all come back as an outcome with
    /// `error` set, so callers never have to handle a dispatch failure.
    pub async fn dispatch(&self, tool_name: &str, args: JsonValue) -> ToolOutcome {
        match AssertUnwindSafe(self.call(tool_name, args)).catch_unwind().await {
            Ok(Ok((outcome, duration_ms))) => {
                tracing::debug!(tool = tool_name, duration_ms, "tool finished");
                outcome
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = tool_name, error = %e, "tool failed");
                ToolOutcome::failure(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = tool_name, panic = %message, "tool panicked");
                ToolOutcome::failure(format!("Tool {} panicked: {}", tool_name, message))
            }
        }
    }

    /// Registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
                api_type: t.api_type().map(str::to_string),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.working_dir
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
    pub api_type: Option<String>,
}
