//! `tern toolbus` subcommands.

use anyhow::{anyhow, Result};
use serde_json::Value as JsonValue;
use tern_toolbus::{Bash, ToolBus};

use crate::cli::{SessionArgs, ToolbusAction};
use crate::output;

pub async fn handle(action: ToolbusAction, session: &SessionArgs) -> Result<()> {
    let bus = build_toolbus(session)?;

    match action {
        ToolbusAction::List => list(&bus),
        ToolbusAction::Info { tool } => info(&bus, &tool),
        ToolbusAction::Call { tool, args } => call(&bus, &tool, &args).await,
    }
}

/// The tool registry a chat session would use with these settings.
pub fn build_toolbus(session: &SessionArgs) -> Result<ToolBus> {
    let config = session.runtime_config()?;
    let workdir = session.workdir()?;

    let mut bus = ToolBus::empty(workdir.clone());
    bus.register(
        Bash::new()
            .with_working_dir(workdir)
            .with_api_type(config.tool_version.bash_type()),
    );
    Ok(bus)
}

fn list(bus: &ToolBus) -> Result<()> {
    let tools = bus.list_tools();

    if tools.is_empty() {
        output::dim("No tools registered");
        return Ok(());
    }

    output::header("Registered Tools");

    let mut table = output::table();
    output::table_header(&mut table, "Tool", "Description");

    let items: Vec<_> = tools
        .iter()
        .map(|t| {
            output::table_row(&mut table, &t.name, &t.description);
            (t.name.as_str(), t.description.as_str())
        })
        .collect();

    output::table_print(&table, &items);

    Ok(())
}

fn info(bus: &ToolBus, tool_name: &str) -> Result<()> {
    let tools = bus.list_tools();
    let tool = tools
        .iter()
        .find(|t| t.name == tool_name)
        .ok_or_else(|| anyhow!("Tool not found: {}", tool_name))?;

    output::header(&format!("Tool: {}", tool.name));
    output::dim(&tool.description);
    if let Some(api_type) = &tool.api_type {
        output::kv("api type:", api_type);
    }
    println!();
    output::header("Parameters");
    output::json_pretty(&tool.parameters);

    Ok(())
}

async fn call(bus: &ToolBus, tool_name: &str, args_str: &str) -> Result<()> {
    let args: JsonValue =
        serde_json::from_str(args_str).map_err(|e| anyhow!("Invalid JSON arguments: {}", e))?;

    let spinner = output::spinner(&format!("Calling {}...", tool_name));

    let (outcome, duration_ms) = match bus.call(tool_name, args).await {
        Ok(result) => result,
        Err(e) => {
            output::spinner_error(&spinner, &format!("{} failed", tool_name));
            return Err(e);
        }
    };

    if outcome.is_failure() {
        output::spinner_error(&spinner, &format!("Completed with error in {}ms", duration_ms));
    } else {
        output::spinner_success(&spinner, &format!("Completed in {}ms", duration_ms));
    }
    println!();
    output::data("outcome", &outcome);

    Ok(())
}
