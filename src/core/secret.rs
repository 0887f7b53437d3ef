//! Scoped secret values for subprocess credential injection
//!
//! A `Secret` is read once from a token file, handed to exactly one
//! `CommandSpec` as an environment variable, and dropped with it. It never
//! implements a printable representation of its contents.

use crate::core::error::{ConfigError, SlipError, SlipResult};
use crate::utils::expand_user;
use std::fmt;
use std::path::PathBuf;

/// An opaque credential value
///
/// `Debug` and `Display` are redacted; callers that genuinely need the value
/// (the subprocess env map) use [`Secret::expose`].
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
  /// Wrap an already-obtained credential
  pub fn new(value: impl Into<String>) -> Self {
    Secret(value.into())
  }

  /// Read a credential from a token file, expanding a leading `~`
  ///
  /// The file content is trimmed (token files conventionally end in a
  /// newline). An empty file is rejected.
  pub fn load(path: &str) -> SlipResult<Self> {
    let expanded: PathBuf = expand_user(path);
    let raw = std::fs::read_to_string(&expanded).map_err(|e| {
      SlipError::Config(ConfigError::TokenFile {
        path: expanded.clone(),
        reason: e.to_string(),
      })
    })?;

    let token = raw.trim();
    if token.is_empty() {
      return Err(SlipError::Config(ConfigError::TokenFile {
        path: expanded,
        reason: "file is empty".to_string(),
      }));
    }

    Ok(Secret(token.to_string()))
  }

  /// Read a credential from an environment variable
  pub fn from_env(var: &str) -> Option<Self> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).map(Secret)
  }

  /// Access the underlying value for subprocess env injection
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Secret([redacted])")
  }
}

impl fmt::Display for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[redacted]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_debug_and_display_are_redacted() {
    let secret = Secret::new("gh_abc123");
    assert_eq!(format!("{:?}", secret), "Secret([redacted])");
    assert_eq!(format!("{}", secret), "[redacted]");
  }

  #[test]
  fn test_load_trims_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.txt");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "tok-value").unwrap();

    let secret = Secret::load(path.to_str().unwrap()).unwrap();
    assert_eq!(secret.expose(), "tok-value");
  }

  #[test]
  fn test_load_rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.txt");
    std::fs::write(&path, "\n").unwrap();

    assert!(Secret::load(path.to_str().unwrap()).is_err());
  }

  #[test]
  fn test_load_missing_file_has_help() {
    let err = Secret::load("/nonexistent/slipway-token.txt").unwrap_err();
    assert!(err.help_message().unwrap().contains("token"));
  }
}
