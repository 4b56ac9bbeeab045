//! tern observability - tracing setup shared by the tern crates
//!
//! Builds a `tracing` subscriber with an env filter, a formatted layer writing
//! to stderr, and an optional OpenTelemetry OTLP export layer.
//!
//! # Quick Start
//!
//! ```no_run
//! use tern_observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("tern")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("info");
//!
//! init(config)?;
//!
//! tracing::info!("Session started");
//! # Ok::<(), tern_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` or `SERVICE_NAME` - Service name
//! - `OTEL_SERVICE_VERSION` or `SERVICE_VERSION` - Service version
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint
//! - `OTEL_LOG_LEVEL` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};

// Macros are exported via #[macro_export] and available as
// tern_observability::turn_span!() and tern_observability::tool_span!().
