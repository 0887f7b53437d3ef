//! CI publish pipeline
//!
//! A linear, fail-fast pipeline mirroring the manually-dispatched publish
//! workflow: emit diagnostic context, verify the checkout and the pinned
//! runtime, ensure the package manager, keep its environment in-project,
//! restore and validate the dependency cache, install, then build and upload
//! to the staging index with the CI-scoped token.
//!
//! Cache conditions are soft: a miss or an unusable restored environment
//! downgrades to a full install. Everything else aborts the remaining steps.

pub mod cache;

use crate::core::config::PublishConfig;
use crate::core::error::{PublishError, SlipError, SlipResult};
use crate::core::exec::{CommandSpec, Exec, ExecOutput};
use crate::core::secret::Secret;
use crate::core::step::{Step, StepObserver, StepOutcome, StepReport, run_steps};
use crate::core::vcs::SystemGit;
use crate::publish::cache::{CacheKey, DepCache, discard_env};
use crate::utils::{expand_user, os_label};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Diagnostic context emitted as the first pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
  pub event: String,
  pub os: String,
  pub git_ref: String,
  pub head: String,
  pub timestamp: String,
}

/// Full run report (`--json` output)
#[derive(Debug, Serialize)]
pub struct PublishReport {
  pub diagnostics: Option<Diagnostics>,
  pub steps: Vec<StepReport>,
}

/// Mutable state threaded through the pipeline steps
#[derive(Default)]
struct PublishState {
  cache_hit: bool,
  cache_key: Option<CacheKey>,
  path_additions: Vec<PathBuf>,
  diagnostics: Option<Diagnostics>,
}

/// Driver for the publish pipeline
pub struct PublishPipeline<'a> {
  exec: &'a dyn Exec,
  config: &'a PublishConfig,
}

impl<'a> PublishPipeline<'a> {
  pub fn new(exec: &'a dyn Exec, config: &'a PublishConfig) -> Self {
    Self { exec, config }
  }

  /// Human-readable plan for `--dry-run`
  pub fn plan(&self) -> Vec<String> {
    vec![
      "emit diagnostic context (event, OS, ref)".to_string(),
      "verify checkout (HEAD resolvable)".to_string(),
      format!("verify runtime matches pin {}", self.config.runtime_version),
      format!("ensure package manager '{}'", self.config.manager),
      "configure in-project environment".to_string(),
      format!("restore dependency cache (key: {}/{}/{})", os_label(), self.config.runtime_version, self.config.lockfile),
      "probe restored environment, discard if unusable".to_string(),
      format!("{} install", self.config.manager),
      format!("build and upload to {} ({})", self.config.index_name, self.config.index),
    ]
  }

  /// Run the pipeline from `start_dir`
  pub fn run(&self, start_dir: &Path, observer: &mut dyn StepObserver) -> SlipResult<PublishReport> {
    let git = SystemGit::open(self.exec, start_dir)?;
    let root = git.work_tree().to_path_buf();

    let mut state = PublishState::default();

    let steps: Vec<Step<'_, PublishState>> = vec![
      Step::new("diagnostics", {
        let git = &git;
        move |state: &mut PublishState| {
          let diag = self.gather_diagnostics(git)?;
          let note = format!("event={} os={} ref={}", diag.event, diag.os, diag.git_ref);
          state.diagnostics = Some(diag);
          Ok(StepOutcome::completed_with(note))
        }
      }),
      Step::new("verify-checkout", {
        let git = &git;
        move |_: &mut PublishState| {
          let head = git.head_commit()?;
          Ok(StepOutcome::completed_with(format!("HEAD {}", &head[..12.min(head.len())])))
        }
      }),
      Step::new("verify-runtime", {
        let root = root.clone();
        move |_: &mut PublishState| self.verify_runtime(&root)
      }),
      Step::new("ensure-manager", {
        let root = root.clone();
        move |state: &mut PublishState| self.ensure_manager(&root, state)
      }),
      Step::new("configure-env", {
        let root = root.clone();
        move |state: &mut PublishState| self.configure_env(&root, state)
      }),
      Step::new("restore-cache", {
        let root = root.clone();
        move |state: &mut PublishState| self.restore_cache(&root, state)
      }),
      Step::new("probe-cache", {
        let root = root.clone();
        move |state: &mut PublishState| self.probe_cache(&root, state)
      }),
      Step::new("install-deps", {
        let root = root.clone();
        move |state: &mut PublishState| self.install_deps(&root, state)
      }),
      Step::new("build-and-upload", {
        let root = root.clone();
        move |state: &mut PublishState| self.build_and_upload(&root, state)
      }),
    ];

    let reports = run_steps(&mut state, steps, observer)?;

    Ok(PublishReport {
      diagnostics: state.diagnostics,
      steps: reports,
    })
  }

  fn gather_diagnostics(&self, git: &SystemGit) -> SlipResult<Diagnostics> {
    let event = std::env::var("SLIPWAY_EVENT")
      .or_else(|_| std::env::var("GITHUB_EVENT_NAME"))
      .unwrap_or_else(|_| "manual".to_string());
    let git_ref = std::env::var("GITHUB_REF").unwrap_or_else(|_| git.current_branch().unwrap_or_else(|_| "HEAD".to_string()));
    let head = git.head_commit().unwrap_or_else(|_| "unknown".to_string());

    Ok(Diagnostics {
      event,
      os: os_label().to_string(),
      git_ref,
      head,
      timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    })
  }

  fn verify_runtime(&self, root: &Path) -> SlipResult<StepOutcome> {
    let spec = CommandSpec::from_argv(&self.config.runtime)?.current_dir(root);
    let output = self.run_checked(&spec, "verify-runtime")?;

    let combined = format!("{} {}", output.stdout, output.stderr);
    let found = extract_version(&combined).unwrap_or_else(|| combined.trim().to_string());

    let pin = &self.config.runtime_version;
    if found == *pin || found.starts_with(&format!("{}.", pin)) {
      Ok(StepOutcome::completed_with(format!("runtime {}", found)))
    } else {
      Err(SlipError::Publish(PublishError::RuntimeMismatch {
        pinned: pin.clone(),
        found,
      }))
    }
  }

  fn ensure_manager(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    if let Some(version) = self.probe_manager(root, state) {
      return Ok(StepOutcome::completed_with(version));
    }

    let Some(url) = &self.config.installer_url else {
      return Err(SlipError::Publish(PublishError::ManagerUnavailable {
        manager: self.config.manager.clone(),
      }));
    };

    // Fetched installer script, same shape as the upstream docs recommend
    let spec = CommandSpec::new("sh", &["-c"])
      .arg(format!("curl -sSL {} | sh", url))
      .current_dir(root);
    self.run_checked(&spec, "ensure-manager")?;

    let bin_dir = self
      .config
      .installer_bin_dir
      .as_deref()
      .map(expand_user)
      .unwrap_or_else(|| expand_user("~/.local/bin"));
    state.path_additions.push(bin_dir);

    match self.probe_manager(root, state) {
      Some(version) => Ok(StepOutcome::completed_with(format!("installed {}", version))),
      None => Err(SlipError::Publish(PublishError::ManagerUnavailable {
        manager: self.config.manager.clone(),
      })),
    }
  }

  /// Probe `manager --version`; None when missing or failing
  fn probe_manager(&self, root: &Path, state: &PublishState) -> Option<String> {
    let spec = self.manager_cmd(&["--version"], root, state);
    match self.exec.run(&spec) {
      Ok(output) if output.success() => Some(output.stdout.trim().to_string()),
      _ => None,
    }
  }

  fn configure_env(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    if self.config.env_config_args.is_empty() {
      return Ok(StepOutcome::skipped("no env configuration requested"));
    }

    let args: Vec<&str> = self.config.env_config_args.iter().map(|s| s.as_str()).collect();
    let spec = self.manager_cmd(&args, root, state);
    self.run_checked(&spec, "configure-env")?;
    Ok(StepOutcome::completed())
  }

  fn restore_cache(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    let lockfile = root.join(&self.config.lockfile);
    if !lockfile.exists() {
      return Ok(StepOutcome::skipped(format!("no lock file at {}", lockfile.display())));
    }

    let key = CacheKey::compute(os_label(), &self.config.runtime_version, &lockfile)?;
    state.cache_key = Some(key.clone());

    let env_dir = root.join(&self.config.env_dir);
    if env_dir.exists() {
      return Ok(StepOutcome::skipped("environment already present"));
    }

    let cache = DepCache::open(expand_user(&self.config.cache_dir));
    if cache.restore(&key, &env_dir)? {
      state.cache_hit = true;
      Ok(StepOutcome::completed_with(format!("restored {}", key)))
    } else {
      Ok(StepOutcome::skipped(format!("cache miss for {}", key)))
    }
  }

  fn probe_cache(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    if !state.cache_hit {
      return Ok(StepOutcome::skipped("no cache restored"));
    }

    let env_dir = root.join(&self.config.env_dir);
    let probe_program = self
      .config
      .runtime
      .first()
      .map(|p| Path::new(p).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| p.clone()))
      .unwrap_or_else(|| "python".to_string());
    let probe = CommandSpec::new(
      env_dir.join("bin").join(probe_program).to_string_lossy().to_string(),
      &["--version"],
    )
    .current_dir(root);

    let usable = matches!(self.exec.run(&probe), Ok(output) if output.success());
    if usable {
      return Ok(StepOutcome::completed_with("restored environment ok"));
    }

    // Corrupted cache contents are never trusted
    discard_env(&env_dir)?;
    state.cache_hit = false;
    Ok(StepOutcome::completed_with("restored environment unusable, discarded"))
  }

  fn install_deps(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    let spec = self.manager_cmd(&["install"], root, state);
    self.run_checked(&spec, "install-deps")?;

    // Populate the cache on a miss; a save failure only degrades the next run
    let env_dir = root.join(&self.config.env_dir);
    if !state.cache_hit
      && let Some(key) = &state.cache_key
      && env_dir.is_dir()
    {
      let cache = DepCache::open(expand_user(&self.config.cache_dir));
      if let Err(e) = cache.save(key, &env_dir) {
        return Ok(StepOutcome::completed_with(format!("installed (cache save failed: {})", e)));
      }
      return Ok(StepOutcome::completed_with(format!("installed, cached as {}", key)));
    }

    Ok(StepOutcome::completed())
  }

  fn build_and_upload(&self, root: &Path, state: &mut PublishState) -> SlipResult<StepOutcome> {
    let token = Secret::from_env(&self.config.token_env).ok_or_else(|| {
      SlipError::Publish(PublishError::TokenMissing {
        env_var: self.config.token_env.clone(),
      })
    })?;

    let build = self.manager_cmd(&["build"], root, state);
    self.run_checked(&build, "build")?;

    // Register the staging repository by name, then publish to that name.
    // The index URL was validated non-production at config load.
    let repo_key = format!("repositories.{}", self.config.index_name);
    let register = self
      .manager_cmd(&["config"], root, state)
      .arg(repo_key)
      .arg(self.config.index.clone());
    self.run_checked(&register, "register-index")?;

    let upload = self
      .manager_cmd(&["publish", "--repository"], root, state)
      .arg(self.config.index_name.clone())
      .secret_env(self.config.token_env.clone(), token);
    self.run_checked(&upload, "upload")?;

    Ok(StepOutcome::completed_with(format!("uploaded to {}", self.config.index_name)))
  }

  /// Build a manager invocation with the pipeline's PATH additions
  fn manager_cmd(&self, args: &[&str], root: &Path, state: &PublishState) -> CommandSpec {
    let mut spec = CommandSpec::new(self.config.manager.clone(), args).current_dir(root);
    for dir in &state.path_additions {
      spec = spec.prepend_path(dir.clone());
    }
    spec
  }

  /// Run a spec, mapping nonzero exit to a pipeline step failure
  fn run_checked(&self, spec: &CommandSpec, step: &str) -> SlipResult<ExecOutput> {
    let output = self.exec.run(spec)?;
    if !output.success() {
      return Err(SlipError::Publish(PublishError::StepFailed {
        step: step.to_string(),
        detail: format!("{}\n{}", spec, output.stderr.trim()),
      }));
    }
    Ok(output)
  }
}

/// Extract the first dotted-digit token from probe output
/// (e.g. "Python 3.10.12" -> "3.10.12")
fn extract_version(output: &str) -> Option<String> {
  output
    .split_whitespace()
    .find(|tok| tok.chars().next().is_some_and(|c| c.is_ascii_digit()) && tok.contains('.'))
    .map(|tok| tok.trim_matches(|c: char| !c.is_ascii_digit() && c != '.').to_string())
}
