//! Core types and configuration for dfgate.
//!
//! This crate collects the CI environment into [`GateConfig`], defines the
//! `dfgate.toml` tool schema ([`ToolsConfig`]), the Docker build coordinates
//! ([`BuildCoordinates`]), and shared error types.

pub mod config;
pub mod context;
pub mod error;

pub use config::{BuildToolConfig, GateConfig, GeneratorConfig, GitConfig, ToolsConfig};
pub use context::{BuildCoordinates, CiContext, CiMode};
pub use error::{Error, Result};
