//! Model and request defaults

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_MAX_TOKENS: u32 = 16384;

/// Recent user messages marked as cache breakpoints per request.
pub const DEFAULT_MAX_CACHE_BREAKPOINTS: usize = 2;
/// The service accepts four cache markers per request; one goes to the system block.
pub const MAX_MESSAGE_CACHE_BREAKPOINTS: usize = 3;

pub const PROMPT_CACHING_BETA_FLAG: &str = "prompt-caching-2024-07-31";

pub const TOOL_VERSION_20250124: &str = "computer_use_20250124";
pub const TOOL_VERSION_20241022: &str = "computer_use_20241022";
pub const TOOL_VERSION_CUSTOM: &str = "custom";
pub const DEFAULT_TOOL_VERSION: &str = TOOL_VERSION_20250124;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1/";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Seconds a shell command may run before it is killed.
pub const BASH_TIMEOUT_SECS: u64 = 120;

pub const SYSTEM_PROMPT: &str = "\
You are a helpful assistant running in a terminal session on a Linux machine. \
You can run shell commands with the bash tool. The working directory is the \
directory the session was started in. Prefer short, non-interactive commands \
and inspect their output before drawing conclusions. When a command fails, read \
the error and adjust instead of repeating it unchanged. Keep answers concise.";
