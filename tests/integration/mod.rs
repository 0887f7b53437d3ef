//! Integration tests for the slipway CLI
//!
//! These drive the compiled binary against real temporary git repositories,
//! with stub executables standing in for the release tool, the runtime, and
//! the package manager.

mod helpers;
mod test_init;
mod test_publish;
mod test_release;
