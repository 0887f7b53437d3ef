//! CLI commands for slipway
//!
//! - **init**: write a default slipway.toml for the project
//! - **release**: the manual release sequence (clean-tree check, push,
//!   release tool, push again)
//! - **publish**: the CI publish pipeline (diagnostics through staging upload)
//!
//! All commands accept `&ProjectContext` to avoid redundant root resolution.

pub mod init;
pub mod publish;
pub mod release;

pub use init::run_init;
pub use publish::run_publish;
pub use release::run_release;
