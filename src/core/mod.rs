//! Core engine for slipway operations
//!
//! This module contains the fundamental building blocks for both procedures:
//!
//! - **config**: slipway configuration (slipway.toml) parsing and validation
//! - **context**: unified project context built once and shared across commands
//! - **error**: error types with exit codes and contextual help messages
//! - **exec**: subprocess execution seam (CommandSpec / Exec / SystemExec)
//! - **secret**: scoped credential handling with redacted rendering
//! - **step**: fail-fast ordered step runner with per-step reporting
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod secret;
pub mod step;
pub mod vcs;
