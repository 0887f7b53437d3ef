//! Release Trigger procedure
//!
//! The manual release sequence: verify a clean working tree, push pending
//! commits, invoke the release tool with a file-scoped credential and all
//! forwarded arguments, then push again to publish whatever the tool created
//! (tags, changelog commits).
//!
//! Ordering is a hard contract:
//!
//! 1. resolve the project root from the repository
//! 2. dirty-tree check; dirty aborts with exit 1 before any mutation
//! 3. `git push <remote>`
//! 4. release tool with the token in its environment and forwarded args intact
//! 5. `git push <remote>` again - never reached when the tool failed
//!
//! Not idempotent-safe to re-run blindly (it pushes twice); `--dry-run` is
//! the safe preview.

use crate::core::config::ReleaseConfig;
use crate::core::error::{GitError, SlipError, SlipResult};
use crate::core::exec::{CommandSpec, Exec};
use crate::core::secret::Secret;
use crate::core::step::{Step, StepObserver, StepOutcome, StepReport, run_steps};
use crate::core::vcs::SystemGit;
use std::path::Path;

/// Driver for the release sequence
pub struct ReleaseDriver<'a> {
  exec: &'a dyn Exec,
  config: &'a ReleaseConfig,
}

impl<'a> ReleaseDriver<'a> {
  pub fn new(exec: &'a dyn Exec, config: &'a ReleaseConfig) -> Self {
    Self { exec, config }
  }

  /// Human-readable plan for `--dry-run`
  pub fn plan(&self, tool_args: &[String]) -> Vec<String> {
    let mut tool_line = self.config.tool.join(" ");
    if !tool_args.is_empty() {
      tool_line.push(' ');
      tool_line.push_str(&tool_args.join(" "));
    }
    vec![
      "verify clean working tree (git status --porcelain)".to_string(),
      format!("git push {}", self.config.remote),
      format!("{}={}... {}", self.config.token_env, "***", tool_line),
      format!("git push {} (tags, changelog commits)", self.config.remote),
    ]
  }

  /// Run the release sequence from `start_dir`
  ///
  /// `tool_args` are forwarded verbatim to the release tool.
  pub fn run(
    &self,
    start_dir: &Path,
    tool_args: &[String],
    observer: &mut dyn StepObserver,
  ) -> SlipResult<Vec<StepReport>> {
    let git = SystemGit::open(self.exec, start_dir)?;
    let remote = self.config.remote.clone();

    let steps: Vec<Step<'_, ()>> = vec![
      Step::new("check-clean", |_| match git.dirty_status()? {
        None => Ok(StepOutcome::completed()),
        Some(status) => Err(SlipError::Git(GitError::DirtyTree { status })),
      }),
      Step::new("push", {
        let git = &git;
        let remote = remote.clone();
        move |_| {
          git.push(&remote)?;
          Ok(StepOutcome::completed())
        }
      }),
      Step::new("release-tool", {
        let git = &git;
        move |_| self.invoke_tool(git.work_tree(), tool_args)
      }),
      Step::new("push-artifacts", {
        let git = &git;
        move |_| {
          git.push(&remote)?;
          Ok(StepOutcome::completed())
        }
      }),
    ];

    run_steps(&mut (), steps, observer)
  }

  /// Invoke the release tool with the credential scoped to this one call
  ///
  /// The token is read here (not earlier) so a dirty tree or failed push
  /// never touches the token file, and it is dropped with the CommandSpec.
  fn invoke_tool(&self, work_tree: &Path, tool_args: &[String]) -> SlipResult<StepOutcome> {
    let token = Secret::load(&self.config.token_path)?;

    let spec = CommandSpec::from_argv(&self.config.tool)?
      .args_from(tool_args)
      .current_dir(work_tree)
      .secret_env(self.config.token_env.clone(), token);

    let rendered = spec.to_string();
    let output = self.exec.run(&spec)?;

    if !output.success() {
      return Err(SlipError::Tool {
        command: rendered,
        stderr: output.stderr.trim().to_string(),
      });
    }

    Ok(StepOutcome::completed())
  }
}
