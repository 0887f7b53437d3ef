//! Error types for slipway with contextual messages and exit codes
//!
//! Failures are split into three classes: precondition failures (dirty
//! working tree) exit with a distinct code before any side effect, subprocess
//! and I/O failures propagate fail-fast, and configuration problems carry a
//! suggestion for the user.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for slipway
///
/// The release contract is: 0 = success, 1 = dirty working tree, other
/// nonzero = underlying command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Precondition failure (dirty working tree); aborts before any mutation
  Precondition = 1,
  /// System error (git, release tool, package manager, network, I/O)
  System = 2,
  /// User error (config, invalid args, missing files)
  User = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for slipway
#[derive(Debug)]
pub enum SlipError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Publish pipeline errors
  Publish(PublishError),

  /// Release tool invocation failed
  Tool { command: String, stderr: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl SlipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    SlipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    SlipError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      SlipError::Message { message, context, help } => SlipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      SlipError::Git(GitError::DirtyTree { .. }) => ExitCode::Precondition,
      SlipError::Config(_) => ExitCode::User,
      SlipError::Git(_) => ExitCode::System,
      SlipError::Publish(_) => ExitCode::System,
      SlipError::Tool { .. } => ExitCode::System,
      SlipError::Io(_) => ExitCode::System,
      SlipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      SlipError::Config(e) => e.help_message(),
      SlipError::Git(e) => e.help_message(),
      SlipError::Publish(e) => e.help_message(),
      SlipError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for SlipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SlipError::Config(e) => write!(f, "{}", e),
      SlipError::Git(e) => write!(f, "{}", e),
      SlipError::Publish(e) => write!(f, "{}", e),
      SlipError::Tool { command, stderr } => {
        write!(f, "Release tool failed: {}\n{}", command, stderr)
      }
      SlipError::Io(e) => write!(f, "I/O error: {}", e),
      SlipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for SlipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      SlipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for SlipError {
  fn from(err: io::Error) -> Self {
    SlipError::Io(err)
  }
}

impl From<String> for SlipError {
  fn from(msg: String) -> Self {
    SlipError::message(msg)
  }
}

impl From<&str> for SlipError {
  fn from(msg: &str) -> Self {
    SlipError::message(msg)
  }
}

impl From<toml_edit::TomlError> for SlipError {
  fn from(err: toml_edit::TomlError) -> Self {
    SlipError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for SlipError {
  fn from(err: toml_edit::de::Error) -> Self {
    SlipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for SlipError {
  fn from(err: toml_edit::ser::Error) -> Self {
    SlipError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for SlipError {
  fn from(err: serde_json::Error) -> Self {
    SlipError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for SlipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    SlipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::env::VarError> for SlipError {
  fn from(err: std::env::VarError) -> Self {
    SlipError::message(format!("Environment variable error: {}", err))
  }
}

impl From<semver::Error> for SlipError {
  fn from(err: semver::Error) -> Self {
    SlipError::message(format!("Version parse error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// slipway.toml not found
  NotFound { project_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Token file missing or unreadable
  TokenFile { path: PathBuf, reason: String },

  /// Publish index points at a production endpoint
  ProductionIndex { index: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `slipway init` to create a configuration file.".to_string()),
      ConfigError::TokenFile { path, .. } => Some(format!(
        "Write the release token (single line) to {} with mode 0600.",
        path.display()
      )),
      ConfigError::ProductionIndex { .. } => {
        Some("slipway publishes to a staging index only. Point publish.index at a test endpoint.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { project_root } => {
        write!(
          f,
          "No slipway configuration found.\nExpected file: {}/slipway.toml",
          project_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::TokenFile { path, reason } => {
        write!(f, "Cannot read token file {}: {}", path.display(), reason)
      }
      ConfigError::ProductionIndex { index } => {
        write!(f, "Refusing to target production package index: {}", index)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Working tree has uncommitted changes
  DirtyTree { status: String },

  /// Push failed
  PushFailed { remote: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::DirtyTree { .. } => {
        Some("Commit or stash your changes before releasing.".to_string())
      }
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run slipway from inside a git repository (looked from: {})",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::DirtyTree { status } => {
        write!(f, "Working tree has uncommitted changes:\n{}", status)
      }
      GitError::PushFailed { remote, reason } => {
        write!(f, "Push to {} failed: {}", remote, reason)
      }
    }
  }
}

/// Publish pipeline errors
#[derive(Debug)]
pub enum PublishError {
  /// A pipeline subprocess exited nonzero
  StepFailed { step: String, detail: String },

  /// Provisioned runtime does not match the pinned version
  RuntimeMismatch { pinned: String, found: String },

  /// Package manager missing and no installer configured
  ManagerUnavailable { manager: String },

  /// CI token environment variable not set
  TokenMissing { env_var: String },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::RuntimeMismatch { pinned, .. } => Some(format!(
        "Provision runtime {} in CI before running `slipway publish`.",
        pinned
      )),
      PublishError::ManagerUnavailable { manager } => Some(format!(
        "Install '{}' or set publish.installer_url in slipway.toml.",
        manager
      )),
      PublishError::TokenMissing { env_var } => Some(format!(
        "Export {} from the CI secret store (staging scope only).",
        env_var
      )),
      _ => None,
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::StepFailed { step, detail } => {
        write!(f, "Publish step '{}' failed: {}", step, detail)
      }
      PublishError::RuntimeMismatch { pinned, found } => {
        write!(f, "Runtime version mismatch: pinned {}, found {}", pinned, found)
      }
      PublishError::ManagerUnavailable { manager } => {
        write!(f, "Package manager '{}' is not available", manager)
      }
      PublishError::TokenMissing { env_var } => {
        write!(f, "Publish token environment variable {} is not set", env_var)
      }
    }
  }
}

/// Result type alias for slipway
pub type SlipResult<T> = Result<T, SlipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> SlipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> SlipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<SlipError>,
{
  fn context(self, ctx: impl Into<String>) -> SlipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> SlipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &SlipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Interop with helpers that return anyhow::Error
impl From<anyhow::Error> for SlipError {
  fn from(err: anyhow::Error) -> Self {
    SlipError::message(err.to_string())
  }
}
