//! System git backend - zero crate dependencies
//!
//! Uses git plumbing commands for all operations, routed through the `Exec`
//! seam so procedures built on top are sequence-testable. Every git command
//! runs with an isolated environment (PATH/HOME whitelist) and safe config
//! overrides.

use crate::core::error::{GitError, SlipError, SlipResult};
use crate::core::exec::{CommandSpec, Exec};
use std::path::{Path, PathBuf};

/// Git backend using system git
pub struct SystemGit<'e> {
  exec: &'e dyn Exec,

  /// Working tree root (resolved by `open`)
  work_tree: PathBuf,
}

impl std::fmt::Debug for SystemGit<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SystemGit")
      .field("work_tree", &self.work_tree)
      .finish_non_exhaustive()
  }
}

impl<'e> SystemGit<'e> {
  /// Open a git repository, resolving the working tree root
  ///
  /// The root comes from `git rev-parse --show-toplevel` so callers get the
  /// real project root regardless of where the binary was invoked from.
  pub fn open(exec: &'e dyn Exec, path: &Path) -> SlipResult<Self> {
    let spec = git_cmd(path).arg("rev-parse").arg("--show-toplevel");
    let output = exec.run(&spec)?;

    if !output.success() {
      if output.stderr.contains("not a git repository") {
        return Err(SlipError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(SlipError::message(format!(
        "Failed to open git repository: {}",
        output.stderr
      )));
    }

    Ok(Self {
      exec,
      work_tree: PathBuf::from(output.stdout.trim()),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Check for uncommitted changes (`git status --porcelain`)
  ///
  /// Returns `Ok(None)` for a clean tree, `Ok(Some(status))` with the
  /// porcelain output when anything is staged, modified, or untracked.
  pub fn dirty_status(&self) -> SlipResult<Option<String>> {
    let spec = self.cmd().arg("status").arg("--porcelain");
    let output = self.exec.run(&spec)?;

    if !output.success() {
      return Err(SlipError::Git(GitError::CommandFailed {
        command: "git status --porcelain".to_string(),
        stderr: output.stderr,
      }));
    }

    let status = output.stdout.trim_end();
    if status.is_empty() {
      Ok(None)
    } else {
      Ok(Some(status.to_string()))
    }
  }

  /// Push to a remote; nonzero exit is fatal
  pub fn push(&self, remote: &str) -> SlipResult<()> {
    let spec = self.cmd().arg("push").arg(remote);
    let output = self.exec.run(&spec)?;

    if !output.success() {
      return Err(SlipError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        reason: output.stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> SlipResult<String> {
    let spec = self.cmd().arg("rev-parse").arg("HEAD");
    let output = self.exec.run(&spec)?;

    if !output.success() {
      return Err(SlipError::Git(GitError::CommandFailed {
        command: "git rev-parse HEAD".to_string(),
        stderr: output.stderr,
      }));
    }

    Ok(output.stdout.trim().to_string())
  }

  /// Get current branch name ("HEAD" when detached)
  pub fn current_branch(&self) -> SlipResult<String> {
    let spec = self.cmd().arg("rev-parse").arg("--abbrev-ref").arg("HEAD");
    let output = self.exec.run(&spec)?;

    if !output.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(output.stdout.trim().to_string())
  }

  fn cmd(&self) -> CommandSpec {
    git_cmd(&self.work_tree)
  }
}

/// Build a safe git command spec for the given directory
///
/// - Runs with `-C <dir>`
/// - Cleared environment, PATH and HOME whitelisted
/// - Safe configuration overrides (protocol v2, no detached-HEAD advice)
fn git_cmd(dir: &Path) -> CommandSpec {
  CommandSpec::new("git", &[])
    .arg("-C")
    .arg(dir.to_string_lossy().to_string())
    .arg("-c")
    .arg("protocol.version=2")
    .arg("-c")
    .arg("advice.detachedHead=false")
    .isolated()
}
