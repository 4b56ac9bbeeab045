//! Shared constants for tern.

pub mod app;
pub mod defaults;
