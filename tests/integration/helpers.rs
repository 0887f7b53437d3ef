//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A test project: a work tree with history, a bare origin, and a bin
/// directory for stub executables that gets prepended to PATH
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
  pub bin: PathBuf,
}

impl TestRepo {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("work");
    let remote = root.path().join("origin.git");
    let bin = root.path().join("bin");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&bin)?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("README.md"), "# test project\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    git(root.path(), &["init", "--bare", "origin.git"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;
    git(&path, &["push", "-u", "origin", "main"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
      bin,
    })
  }

  /// Write a file into the work tree
  pub fn write_file(&self, name: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(name), content)?;
    Ok(())
  }

  /// Stage and commit everything
  pub fn commit_all(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Install an executable stub script into the bin directory
  pub fn stub_bin(&self, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = self.bin.join(name);
    std::fs::write(&script, format!("#!/bin/sh\n{}\n", body))?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(script)
  }

  /// Write a token file outside the work tree
  pub fn write_token(&self, contents: &str) -> Result<PathBuf> {
    let token_path = self._root.path().join("token.txt");
    std::fs::write(&token_path, format!("{}\n", contents))?;
    Ok(token_path)
  }

  /// HEAD of the work tree
  pub fn head_sha(&self) -> Result<String> {
    let out = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
  }

  /// Tip of main on the bare origin
  pub fn origin_main_sha(&self) -> Result<String> {
    let out = git(&self.remote, &["rev-parse", "main"])?;
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
  }
}

/// Run git in a directory, failing the test on error
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the slipway binary; callers inspect the exit status themselves
pub fn run_slipway(repo: &TestRepo, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let slipway_bin = env!("CARGO_BIN_EXE_slipway");
  let path_var = format!(
    "{}:{}",
    repo.bin.display(),
    std::env::var("PATH").unwrap_or_default()
  );

  let mut cmd = Command::new(slipway_bin);
  cmd.current_dir(&repo.path).args(args).env("PATH", path_var);
  for (key, value) in envs {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run slipway")
}

/// Run slipway and fail the test when it exits nonzero
pub fn run_slipway_ok(repo: &TestRepo, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let output = run_slipway(repo, args, envs)?;

  if !output.status.success() {
    anyhow::bail!(
      "slipway command failed: slipway {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

/// Combined stdout + stderr as a string
pub fn all_output(output: &Output) -> String {
  format!(
    "{}{}",
    String::from_utf8_lossy(&output.stdout),
    String::from_utf8_lossy(&output.stderr)
  )
}
