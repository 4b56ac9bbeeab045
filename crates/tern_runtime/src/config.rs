//! Runtime configuration for tern

use std::str::FromStr;

use tern_constant::defaults::{
    DEFAULT_MAX_CACHE_BREAKPOINTS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    MAX_MESSAGE_CACHE_BREAKPOINTS, PROMPT_CACHING_BETA_FLAG, SYSTEM_PROMPT, TOOL_VERSION_20241022,
    TOOL_VERSION_20250124, TOOL_VERSION_CUSTOM,
};

use crate::error::RuntimeError;

/// Tool-set version, selecting the service-side tool definitions and their feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolVersion {
    #[default]
    ComputerUse20250124,
    ComputerUse20241022,
    /// Plain custom tools described by their own JSON schema.
    Custom,
}

impl ToolVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolVersion::ComputerUse20250124 => TOOL_VERSION_20250124,
            ToolVersion::ComputerUse20241022 => TOOL_VERSION_20241022,
            ToolVersion::Custom => TOOL_VERSION_CUSTOM,
        }
    }

    pub fn beta_flag(&self) -> Option<&'static str> {
        match self {
            ToolVersion::ComputerUse20250124 => Some("computer-use-2025-01-24"),
            ToolVersion::ComputerUse20241022 => Some("computer-use-2024-10-22"),
            ToolVersion::Custom => None,
        }
    }

    /// Service-defined type of the `bash` tool in this version.
    pub fn bash_type(&self) -> Option<&'static str> {
        match self {
            ToolVersion::ComputerUse20250124 => Some("bash_20250124"),
            ToolVersion::ComputerUse20241022 => Some("bash_20241022"),
            ToolVersion::Custom => None,
        }
    }
}

impl FromStr for ToolVersion {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TOOL_VERSION_20250124 => Ok(ToolVersion::ComputerUse20250124),
            TOOL_VERSION_20241022 => Ok(ToolVersion::ComputerUse20241022),
            TOOL_VERSION_CUSTOM => Ok(ToolVersion::Custom),
            other => Err(RuntimeError::Config(format!("unknown tool version: {}", other))),
        }
    }
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model to use
    pub model: String,
    /// Maximum tokens for response generation
    pub max_tokens: u32,
    /// Recent user messages marked as cache breakpoints per request
    pub max_cache_breakpoints: usize,
    /// System prompt sent with every request
    pub system_prompt: String,
    /// Tool-set version
    pub tool_version: ToolVersion,
    /// Feature flags sent in addition to the derived ones
    pub extra_feature_flags: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_cache_breakpoints: DEFAULT_MAX_CACHE_BREAKPOINTS,
            system_prompt: SYSTEM_PROMPT.to_string(),
            tool_version: ToolVersion::default(),
            extra_feature_flags: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_cache_breakpoints(mut self, max: usize) -> Self {
        self.max_cache_breakpoints = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_tool_version(mut self, version: ToolVersion) -> Self {
        self.tool_version = version;
        self
    }

    pub fn with_feature_flag(mut self, flag: impl Into<String>) -> Self {
        self.extra_feature_flags.push(flag.into());
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `TERN_MODEL`, `TERN_MAX_TOKENS`, `TERN_MAX_CACHE_BREAKPOINTS` and
    /// `TERN_TOOL_VERSION`. Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(model) = lookup("TERN_MODEL").filter(|m| !m.is_empty()) {
            config.model = model;
        }

        if let Some(val) = lookup("TERN_MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
            config.max_tokens = val;
        }

        if let Some(val) =
            lookup("TERN_MAX_CACHE_BREAKPOINTS").and_then(|v| v.parse::<usize>().ok())
        {
            config.max_cache_breakpoints = val;
        }

        if let Some(version) =
            lookup("TERN_TOOL_VERSION").and_then(|v| v.parse::<ToolVersion>().ok())
        {
            config.tool_version = version;
        }

        config
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.max_tokens == 0 {
            return Err(RuntimeError::Config("max_tokens must be positive".to_string()));
        }
        if self.max_cache_breakpoints > MAX_MESSAGE_CACHE_BREAKPOINTS {
            return Err(RuntimeError::Config(format!(
                "max_cache_breakpoints must be at most {}, got {}",
                MAX_MESSAGE_CACHE_BREAKPOINTS, self.max_cache_breakpoints
            )));
        }
        Ok(())
    }

    /// Tool-version flag, then prompt caching, then extras; duplicates dropped.
    pub fn feature_flags(&self) -> Vec<String> {
        let mut candidates: Vec<&str> = Vec::new();
        candidates.extend(self.tool_version.beta_flag());
        candidates.push(PROMPT_CACHING_BETA_FLAG);
        candidates.extend(self.extra_feature_flags.iter().map(String::as_str));

        let mut flags: Vec<String> = Vec::new();
        for flag in candidates {
            if !flags.iter().any(|f| f == flag) {
                flags.push(flag.to_string());
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_runtime_config_new() {
        let config = RuntimeConfig::new();
        assert_eq!(config.model, "claude-3-7-sonnet-20250219");
        assert_eq!(config.max_tokens, 16384);
        assert_eq!(config.max_cache_breakpoints, 2);
        assert_eq!(config.tool_version, ToolVersion::ComputerUse20250124);
        assert!(!config.system_prompt.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_runtime_config_builder() {
        let config = RuntimeConfig::new()
            .with_model("claude-test")
            .with_max_tokens(1024)
            .with_max_cache_breakpoints(3)
            .with_system_prompt("be brief")
            .with_tool_version(ToolVersion::Custom)
            .with_feature_flag("output-128k-2025-02-19");

        assert_eq!(config.model, "claude-test");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.max_cache_breakpoints, 3);
        assert_eq!(config.system_prompt, "be brief");
        assert_eq!(config.tool_version, ToolVersion::Custom);
        assert_eq!(config.extra_feature_flags, vec!["output-128k-2025-02-19"]);
    }

    #[test]
    fn test_tool_version_parse() {
        assert_eq!(
            "computer_use_20241022".parse::<ToolVersion>().unwrap(),
            ToolVersion::ComputerUse20241022
        );
        assert_eq!("custom".parse::<ToolVersion>().unwrap(), ToolVersion::Custom);
        assert!(matches!(
            "computer_use_1999".parse::<ToolVersion>(),
            Err(RuntimeError::Config(_))
        ));
    }

    #[test]
    fn test_tool_version_mappings() {
        assert_eq!(ToolVersion::ComputerUse20250124.bash_type(), Some("bash_20250124"));
        assert_eq!(ToolVersion::ComputerUse20241022.beta_flag(), Some("computer-use-2024-10-22"));
        assert_eq!(ToolVersion::Custom.beta_flag(), None);
        assert_eq!(ToolVersion::Custom.bash_type(), None);
    }

    #[test]
    fn test_feature_flags_order_and_dedup() {
        let config = RuntimeConfig::new()
            .with_feature_flag("prompt-caching-2024-07-31")
            .with_feature_flag("token-efficient-tools-2025-02-19");
        assert_eq!(
            config.feature_flags(),
            vec![
                "computer-use-2025-01-24",
                "prompt-caching-2024-07-31",
                "token-efficient-tools-2025-02-19"
            ]
        );

        let custom = RuntimeConfig::new().with_tool_version(ToolVersion::Custom);
        assert_eq!(custom.feature_flags(), vec!["prompt-caching-2024-07-31"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RuntimeConfig::new().with_max_tokens(0).validate().is_err());
        assert!(RuntimeConfig::new().with_max_cache_breakpoints(4).validate().is_err());
        assert!(RuntimeConfig::new().with_max_cache_breakpoints(0).validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("TERN_MODEL", "claude-env"),
            ("TERN_MAX_TOKENS", "2048"),
            ("TERN_MAX_CACHE_BREAKPOINTS", "1"),
            ("TERN_TOOL_VERSION", "custom"),
        ]));
        assert_eq!(config.model, "claude-env");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.max_cache_breakpoints, 1);
        assert_eq!(config.tool_version, ToolVersion::Custom);
    }

    #[test]
    fn test_from_lookup_ignores_unparsable() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("TERN_MAX_TOKENS", "lots"),
            ("TERN_TOOL_VERSION", "v9"),
        ]));
        assert_eq!(config.max_tokens, 16384);
        assert_eq!(config.tool_version, ToolVersion::ComputerUse20250124);
    }
}
