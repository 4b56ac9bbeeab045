//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tern_runtime::{RuntimeConfig, ToolVersion};

/// Chat with a tool-using Claude model from the terminal
#[derive(Parser)]
#[command(name = "tern", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive chat session (the default)
    Chat,
    /// Inspect and call ToolBus tools
    Toolbus {
        #[command(subcommand)]
        action: ToolbusAction,
    },
}

/// Session settings. Flags override `TERN_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Anthropic API key
    #[arg(long, global = true, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use (default: claude-3-7-sonnet-20250219)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Tool version: computer_use_20250124, computer_use_20241022 or custom
    #[arg(long, global = true)]
    pub tool_version: Option<String>,

    /// Maximum tokens per response
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// Recent user messages marked for prompt caching (0-3)
    #[arg(long, global = true)]
    pub max_cache_breakpoints: Option<usize>,

    /// Working directory for tools (default: current directory)
    #[arg(long, global = true)]
    pub workdir: Option<PathBuf>,
}

impl SessionArgs {
    /// Environment configuration with the flags applied on top.
    pub fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::from_env();
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(version) = &self.tool_version {
            config = config.with_tool_version(version.parse::<ToolVersion>()?);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(max) = self.max_cache_breakpoints {
            config = config.with_max_cache_breakpoints(max);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn workdir(&self) -> Result<PathBuf> {
        match &self.workdir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// The API key, if one was given and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Subcommand)]
pub enum ToolbusAction {
    /// List all registered tools
    List,
    /// Show tool details and parameter schema
    Info {
        /// Tool name
        tool: String,
    },
    /// Call a tool with JSON arguments
    Call {
        /// Tool name
        tool: String,
        /// JSON arguments
        #[arg(short, long)]
        args: String,
    },
}
