//! Application metadata constants

pub const NAME: &str = "tern";
pub const DISPLAY_NAME: &str = "tern";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Terminal chat client for tool-using Claude models";

/// Env var prefix for runtime overrides (`TERN_MODEL`, `TERN_MAX_TOKENS`, ...)
pub const ENV_PREFIX: &str = "TERN_";
