//! Utility functions for path expansion and platform identification

use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` against $HOME
///
/// Paths without a leading tilde are returned unchanged. A bare `~user` form
/// is not supported and is returned as-is.
pub fn expand_user(path: &str) -> PathBuf {
  if path == "~" {
    if let Ok(home) = std::env::var("HOME") {
      return PathBuf::from(home);
    }
  }

  if let Some(rest) = path.strip_prefix("~/") {
    if let Ok(home) = std::env::var("HOME") {
      return Path::new(&home).join(rest);
    }
  }

  PathBuf::from(path)
}

/// Stable OS identifier for cache keys
///
/// Matches the granularity CI cache keys use (per-OS, not per-distro).
pub fn os_label() -> &'static str {
  std::env::consts::OS
}
