//! Unified project context - build once, pass everywhere
//!
//! ProjectContext resolves the project root and loads slipway.toml once in
//! main.rs, then is passed by reference to all commands. The root comes from
//! the repository itself (`git rev-parse --show-toplevel`), never from the
//! binary's own location.

use crate::core::config::SlipConfig;
use crate::core::error::SlipResult;
use crate::core::exec::Exec;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};

/// Shared project-level data for all commands
pub struct ProjectContext {
  /// Project root directory (the git working tree root)
  pub root: PathBuf,

  /// slipway configuration (slipway.toml)
  /// Optional because `init` runs before it exists
  pub config: Option<SlipConfig>,
}

impl ProjectContext {
  /// Build project context starting from a directory
  ///
  /// Resolves the git working tree root and attempts to load slipway.toml.
  /// Config is optional - commands that require it should call
  /// [`ProjectContext::require_config`].
  pub fn build(exec: &dyn Exec, start_dir: &Path) -> SlipResult<Self> {
    let git = SystemGit::open(exec, start_dir)?;
    let root = git.work_tree().to_path_buf();
    let config = SlipConfig::load(&root).ok();

    Ok(Self { root, config })
  }

  /// Get config or error if not found
  pub fn require_config(&self) -> SlipResult<&SlipConfig> {
    self.config.as_ref().ok_or_else(|| {
      crate::core::error::SlipError::with_help(
        "No slipway.toml found.",
        "Run `slipway init` to create one.",
      )
    })
  }
}
