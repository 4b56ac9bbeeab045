//! tern runtime - the turn loop driving a conversation with the model
//!
//! One [`Runtime`] owns one transcript. Each user input runs the turn state
//! machine until the model answers without requesting a tool:
//!
//! ```text
//! AwaitingSend ──▶ Streaming ──▶ DispatchingTools ──▶ Appended ──▶ Done
//!      ▲                                                 │
//!      └──────────────── tool results appended ──────────┘
//! ```
//!
//! Display output flows out through an mpsc channel of
//! [`tern_core::SessionEvent`]s; the transcript is only touched once a step has
//! fully completed.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod runtime;

pub use config::{RuntimeConfig, ToolVersion};
pub use error::{Result, RuntimeError};
pub use runtime::Runtime;
