//! Vetter CLI library components.
//!
//! This crate provides the command-line interface for the dependency risk
//! analyzer. The main binary is in `main.rs`.

pub mod commands;
pub mod formatters;
pub mod input;
pub mod logging;

// Re-export core types for convenience
pub use vetter_core::{AnalysisRequest, Dependency, Report};
