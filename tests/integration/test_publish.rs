//! End-to-end tests for the publish pipeline
//!
//! Stubs replace the runtime probe and the package manager; the staging
//! index is a name the manager stub only records, never contacts.

use crate::helpers::*;
use anyhow::Result;

const TOKEN: &str = "tok-abc123-staging";

fn write_publish_config(repo: &TestRepo) -> Result<()> {
  repo.write_file(
    "slipway.toml",
    r#"[project]
name = "it-publish"

[publish]
runtime = ["runtime-stub", "--version"]
runtime_version = "3.10"
manager = "mgr-stub"
env_config_args = ["config", "virtualenvs.in-project", "true", "--local"]
lockfile = "stub.lock"
env_dir = ".venv"
cache_dir = "cache"
index = "https://staging.example.test/legacy/"
index_name = "staging"
token_env = "PUBLISH_TOKEN"
"#,
  )
}

fn install_stubs(repo: &TestRepo, runtime_output: &str) -> Result<std::path::PathBuf> {
  let log = repo.path.join("mgr.log");
  repo.stub_bin("runtime-stub", &format!(r#"echo "{}""#, runtime_output))?;
  repo.stub_bin(
    "mgr-stub",
    r#"echo "mgr $@" >> "$MGR_LOG"
if [ "$1" = "publish" ] && [ -n "$PUBLISH_TOKEN" ]; then echo "publish-token-present" >> "$MGR_LOG"; fi"#,
  )?;
  Ok(log)
}

#[test]
fn test_publish_happy_path_uploads_to_staging() -> Result<()> {
  let repo = TestRepo::new()?;
  write_publish_config(&repo)?;
  repo.write_file("stub.lock", "locked-deps = 1\n")?;
  repo.commit_all("Add publish config")?;

  let log = install_stubs(&repo, "Python 3.10.9")?;
  let output = run_slipway_ok(
    &repo,
    &["publish"],
    &[("PUBLISH_TOKEN", TOKEN), ("MGR_LOG", &log.to_string_lossy())],
  )?;

  let mgr_log = std::fs::read_to_string(&log)?;
  assert!(mgr_log.contains("mgr config virtualenvs.in-project true --local"));
  assert!(mgr_log.contains("mgr install"));
  assert!(mgr_log.contains("mgr build"));
  assert!(mgr_log.contains("mgr config repositories.staging https://staging.example.test/legacy/"));
  assert!(mgr_log.contains("mgr publish --repository staging"));

  // The token reached the upload subprocess and nothing else
  assert!(mgr_log.contains("publish-token-present"));
  assert!(!all_output(&output).contains(TOKEN));

  Ok(())
}

#[test]
fn test_publish_missing_token_aborts_before_build() -> Result<()> {
  let repo = TestRepo::new()?;
  write_publish_config(&repo)?;
  repo.write_file("stub.lock", "locked-deps = 1\n")?;
  repo.commit_all("Add publish config")?;

  let log = install_stubs(&repo, "Python 3.10.9")?;
  let output = run_slipway(&repo, &["publish"], &[("MGR_LOG", &log.to_string_lossy())])?;

  assert!(!output.status.success());
  assert!(all_output(&output).contains("PUBLISH_TOKEN"));

  // Install ran, build and upload never did
  let mgr_log = std::fs::read_to_string(&log)?;
  assert!(mgr_log.contains("mgr install"));
  assert!(!mgr_log.contains("mgr build"));
  assert!(!mgr_log.contains("mgr publish"));

  Ok(())
}

#[test]
fn test_publish_runtime_mismatch_aborts_pipeline() -> Result<()> {
  let repo = TestRepo::new()?;
  write_publish_config(&repo)?;
  repo.commit_all("Add publish config")?;

  let log = install_stubs(&repo, "Python 3.9.2")?;
  let output = run_slipway(
    &repo,
    &["publish"],
    &[("PUBLISH_TOKEN", TOKEN), ("MGR_LOG", &log.to_string_lossy())],
  )?;

  assert!(!output.status.success());
  assert!(all_output(&output).contains("3.10"));
  assert!(!log.exists(), "manager must not run after a runtime mismatch");

  Ok(())
}

#[test]
fn test_publish_dry_run_prints_plan_json() -> Result<()> {
  let repo = TestRepo::new()?;
  write_publish_config(&repo)?;
  repo.commit_all("Add publish config")?;

  let output = run_slipway_ok(&repo, &["publish", "--dry-run", "--json"], &[])?;

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let lines = plan.as_array().expect("plan is a JSON array");
  assert_eq!(lines.len(), 9);

  Ok(())
}

#[test]
fn test_publish_json_report_lists_steps() -> Result<()> {
  let repo = TestRepo::new()?;
  write_publish_config(&repo)?;
  repo.write_file("stub.lock", "locked-deps = 1\n")?;
  repo.commit_all("Add publish config")?;

  let log = install_stubs(&repo, "Python 3.10.9")?;
  let output = run_slipway_ok(
    &repo,
    &["publish", "--json"],
    &[
      ("PUBLISH_TOKEN", TOKEN),
      ("MGR_LOG", &log.to_string_lossy()),
      ("SLIPWAY_EVENT", "manual"),
    ],
  )?;

  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let steps = report["steps"].as_array().expect("report has steps");
  assert_eq!(steps.len(), 9);
  assert_eq!(steps[0]["name"], "diagnostics");
  assert_eq!(steps[8]["name"], "build-and-upload");
  assert_eq!(report["diagnostics"]["event"], "manual");

  assert!(!all_output(&output).contains(TOKEN));

  Ok(())
}
