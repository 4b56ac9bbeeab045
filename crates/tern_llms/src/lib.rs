//! tern_llms: provider-agnostic streaming completions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  ProviderRegistry                    │
//! │  ┌──────────────────────────────────────────────┐   │
//! │  │  HashMap<String, Arc<dyn Provider>>           │   │
//! │  └──────────────────────────────────────────────┘   │
//! │                       │                              │
//! │                       ▼                              │
//! │                ┌─────────────┐                       │
//! │                │  Anthropic  │  POST /v1/messages    │
//! │                │  Provider   │  (SSE stream)         │
//! │                └─────────────┘                       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! A provider turns a [`GenerateRequest`] into a [`GenerateStream`] of unified
//! [`StreamEvent`]s: text deltas as they arrive, and each content block once it is
//! complete.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tern_llms::{AnthropicProvider, ProviderRegistry};
//!
//! let provider = AnthropicProvider::from_env().unwrap();
//! let registry = ProviderRegistry::new().register("anthropic", provider);
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;


// Re-export core abstractions
pub use error::{Error, Result};
pub use provider::{Provider, ProviderRegistry};

// Re-export provider implementations
pub use providers::AnthropicProvider;
pub use providers::anthropic::AnthropicConfig;

// Re-export commonly used types
pub use types::{
    CacheControl, ContentPart, FinishReason, GenerateRequest, GenerateStream, Headers, Message,
    ResponseBlock, Role, StreamEvent, SystemBlock, ToolDefinition, ToolResultPart, Usage,
};
