//! Subprocess execution seam
//!
//! Every external command (git, the release tool, the package manager) goes
//! through the `Exec` trait so procedures can be driven by a scripted
//! implementation in tests and their step ordering asserted. `SystemExec` is
//! the production implementation over `std::process::Command`.
//!
//! Secret environment variables are carried separately from plain ones and
//! are rendered by name only; token values never reach stdout or stderr.

use crate::core::error::{SlipError, SlipResult};
use crate::core::secret::Secret;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// Description of a single subprocess invocation
#[derive(Debug, Clone)]
pub struct CommandSpec {
  /// Program name or path
  pub program: String,
  /// Arguments, passed verbatim
  pub args: Vec<String>,
  /// Working directory (inherited when None)
  pub cwd: Option<PathBuf>,
  /// Plain environment additions
  pub envs: Vec<(String, String)>,
  /// Secret environment additions (values redacted in rendering)
  pub secret_envs: Vec<(String, Secret)>,
  /// Extra directories prepended to PATH for this invocation
  pub path_prepend: Vec<PathBuf>,
  /// Clear the inherited environment, whitelisting only PATH and HOME
  pub isolate_env: bool,
}

impl CommandSpec {
  /// Create a spec for `program` with the given arguments
  pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
    Self {
      program: program.into(),
      args: args.iter().map(|a| a.to_string()).collect(),
      cwd: None,
      envs: Vec::new(),
      secret_envs: Vec::new(),
      path_prepend: Vec::new(),
      isolate_env: false,
    }
  }

  /// Create a spec from a full argv (first element is the program)
  pub fn from_argv(argv: &[String]) -> SlipResult<Self> {
    let (program, args) = argv
      .split_first()
      .ok_or_else(|| SlipError::message("Empty command line"))?;
    Ok(Self {
      program: program.clone(),
      args: args.to_vec(),
      cwd: None,
      envs: Vec::new(),
      secret_envs: Vec::new(),
      path_prepend: Vec::new(),
      isolate_env: false,
    })
  }

  /// Set the working directory
  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Append arguments
  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  /// Append several arguments
  pub fn args_from(mut self, args: &[String]) -> Self {
    self.args.extend(args.iter().cloned());
    self
  }

  /// Add a plain environment variable
  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.envs.push((key.into(), value.into()));
    self
  }

  /// Add a secret environment variable
  pub fn secret_env(mut self, key: impl Into<String>, value: Secret) -> Self {
    self.secret_envs.push((key.into(), value));
    self
  }

  /// Prepend a directory to PATH for this invocation
  pub fn prepend_path(mut self, dir: impl Into<PathBuf>) -> Self {
    self.path_prepend.push(dir.into());
    self
  }

  /// Run with a cleared environment (PATH and HOME whitelisted)
  pub fn isolated(mut self) -> Self {
    self.isolate_env = true;
    self
  }
}

impl fmt::Display for CommandSpec {
  /// Render for diagnostics: `ENV_NAME=*** program arg1 arg2`
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, _) in &self.secret_envs {
      write!(f, "{}=*** ", key)?;
    }
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Captured output of a completed subprocess
#[derive(Debug, Clone)]
pub struct ExecOutput {
  pub status_code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ExecOutput {
  /// Whether the subprocess exited zero
  pub fn success(&self) -> bool {
    self.status_code == Some(0)
  }
}

/// Subprocess execution trait
///
/// `run` captures output and returns `Ok` even when the subprocess exits
/// nonzero; callers decide how a nonzero exit maps into the error taxonomy.
/// Spawn failures (program missing, permissions) are `Err`.
pub trait Exec {
  /// Execute a command, blocking until it exits
  fn run(&self, spec: &CommandSpec) -> SlipResult<ExecOutput>;
}

/// Production executor over std::process::Command
pub struct SystemExec;

impl Exec for SystemExec {
  fn run(&self, spec: &CommandSpec) -> SlipResult<ExecOutput> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);

    if let Some(cwd) = &spec.cwd {
      cmd.current_dir(cwd);
    }

    // Isolated environment (don't trust ambient config)
    if spec.isolate_env {
      cmd.env_clear();
      if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
      }
      if let Ok(home) = std::env::var("HOME") {
        cmd.env("HOME", home);
      }
    }

    if !spec.path_prepend.is_empty() {
      let current = std::env::var("PATH").unwrap_or_default();
      let mut parts: Vec<String> = spec
        .path_prepend
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect();
      if !current.is_empty() {
        parts.push(current);
      }
      cmd.env("PATH", parts.join(":"));
    }

    for (key, value) in &spec.envs {
      cmd.env(key, value);
    }
    for (key, secret) in &spec.secret_envs {
      cmd.env(key, secret.expose());
    }

    let output = cmd
      .output()
      .map_err(|e| SlipError::message(format!("Failed to execute {}: {}", spec.program, e)))?;

    Ok(ExecOutput {
      status_code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
  }
}
