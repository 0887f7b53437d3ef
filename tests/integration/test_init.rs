//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let repo = TestRepo::new()?;

  run_slipway_ok(&repo, &["init"], &[])?;

  assert!(repo.path.join("slipway.toml").exists());
  let config = std::fs::read_to_string(repo.path.join("slipway.toml"))?;
  assert!(config.contains("[project]"));
  assert!(config.contains("[release]"));
  assert!(config.contains("[publish]"));
  assert!(config.contains("test.pypi.org"));

  Ok(())
}

#[test]
fn test_init_refuses_overwrite_without_force() -> Result<()> {
  let repo = TestRepo::new()?;

  run_slipway_ok(&repo, &["init"], &[])?;

  let second = run_slipway(&repo, &["init"], &[])?;
  assert!(!second.status.success());
  assert!(all_output(&second).contains("--force"));

  run_slipway_ok(&repo, &["init", "--force"], &[])?;

  Ok(())
}

#[test]
fn test_release_without_config_suggests_init() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = run_slipway(&repo, &["release"], &[])?;
  assert!(!output.status.success());
  assert!(all_output(&output).contains("slipway init"));

  Ok(())
}
