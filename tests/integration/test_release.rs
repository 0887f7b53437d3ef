//! End-to-end tests for the release sequence
//!
//! A stub release tool stands in for semantic-release: it records its
//! arguments and token environment to a log file, and creates a commit the
//! way a real release tool would (version bump, changelog).

use crate::helpers::*;
use anyhow::Result;

const TOKEN: &str = "s3cr3t-token-value";

fn write_release_config(repo: &TestRepo, token_path: &std::path::Path) -> Result<()> {
  repo.write_file(
    "slipway.toml",
    &format!(
      r#"[project]
name = "it-release"

[release]
remote = "origin"
tool = ["release-stub"]
token_path = "{}"
token_env = "GH_TOKEN"
"#,
      token_path.display()
    ),
  )
}

#[test]
fn test_dirty_tree_exits_one_and_runs_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  let token_path = repo.write_token(TOKEN)?;
  write_release_config(&repo, &token_path)?;
  repo.commit_all("Add slipway config")?;

  let log = repo.path.join("tool.log");
  repo.stub_bin("release-stub", r#"echo "args $@" >> "$TOOL_LOG""#)?;

  // Uncommitted modification to a tracked file
  repo.write_file("README.md", "# modified\n")?;

  let before = repo.origin_main_sha()?;
  let output = run_slipway(&repo, &["release"], &[("TOOL_LOG", &log.to_string_lossy())])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!log.exists(), "release tool must not run on a dirty tree");
  assert_eq!(repo.origin_main_sha()?, before, "nothing may be pushed");

  Ok(())
}

#[test]
fn test_clean_release_runs_full_sequence() -> Result<()> {
  let repo = TestRepo::new()?;
  let token_path = repo.write_token(TOKEN)?;
  write_release_config(&repo, &token_path)?;
  repo.commit_all("Add slipway config")?;

  let log = repo.path.join("tool.log");
  repo.stub_bin(
    "release-stub",
    r#"echo "args $@" >> "$TOOL_LOG"
echo "token=$GH_TOKEN" >> "$TOOL_LOG"
git commit --allow-empty -m "chore(release): 1.2.3" --quiet"#,
  )?;

  let output = run_slipway_ok(&repo, &["release", "minor"], &[("TOOL_LOG", &log.to_string_lossy())])?;

  // Tool got the forwarded argument and the token from the file
  let tool_log = std::fs::read_to_string(&log)?;
  assert!(tool_log.contains("args minor"));
  assert!(tool_log.contains(&format!("token={}", TOKEN)));

  // Second push published the tool's release commit
  assert_eq!(repo.origin_main_sha()?, repo.head_sha()?);

  // The token never appears in slipway's own output
  assert!(!all_output(&output).contains(TOKEN));

  Ok(())
}

#[test]
fn test_tool_failure_skips_second_push() -> Result<()> {
  let repo = TestRepo::new()?;
  let token_path = repo.write_token(TOKEN)?;
  write_release_config(&repo, &token_path)?;
  repo.commit_all("Add slipway config")?;
  let pre_tool_head = repo.head_sha()?;

  let log = repo.path.join("tool.log");
  repo.stub_bin(
    "release-stub",
    r#"echo "ran" >> "$TOOL_LOG"
git commit --allow-empty -m "chore(release): 9.9.9" --quiet
echo "ERROR: no release to make" >&2
exit 1"#,
  )?;

  let output = run_slipway(&repo, &["release"], &[("TOOL_LOG", &log.to_string_lossy())])?;

  assert!(!output.status.success());
  assert!(log.exists(), "tool ran and failed");

  // First push delivered the config commit, the tool's commit stayed local
  assert_eq!(repo.origin_main_sha()?, pre_tool_head);
  assert_ne!(repo.head_sha()?, pre_tool_head);

  Ok(())
}

#[test]
fn test_dry_run_redacts_token_and_executes_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  let token_path = repo.write_token(TOKEN)?;
  write_release_config(&repo, &token_path)?;
  repo.commit_all("Add slipway config")?;

  let log = repo.path.join("tool.log");
  let before = repo.origin_main_sha()?;
  let output = run_slipway_ok(
    &repo,
    &["release", "--dry-run", "patch"],
    &[("TOOL_LOG", &log.to_string_lossy())],
  )?;

  let text = all_output(&output);
  assert!(text.contains("GH_TOKEN=***"));
  assert!(text.contains("patch"));
  assert!(!text.contains(TOKEN));

  assert!(!log.exists());
  assert_eq!(repo.origin_main_sha()?, before);

  Ok(())
}
