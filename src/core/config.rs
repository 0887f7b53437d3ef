use crate::core::error::{ConfigError, ResultExt, SlipError, SlipResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for slipway
/// Searched in order: slipway.toml, .slipway.toml, .config/slipway.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlipConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
}

/// Release Trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Push target (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Release tool argv prefix; CLI arguments are appended verbatim
  #[serde(default = "default_release_tool")]
  pub tool: Vec<String>,

  /// Token file read once per release invocation
  #[serde(default = "default_token_path")]
  pub token_path: String,

  /// Environment variable the release tool receives the token in
  #[serde(default = "default_release_token_env")]
  pub token_env: String,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_release_tool() -> Vec<String> {
  vec!["semantic-release".to_string(), "version".to_string()]
}

fn default_token_path() -> String {
  "~/.private/github-semantic-versioning_token.txt".to_string()
}

fn default_release_token_env() -> String {
  "GH_TOKEN".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      tool: default_release_tool(),
      token_path: default_token_path(),
      token_env: default_release_token_env(),
    }
  }
}

/// CI publish pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
  /// Runtime probe command (prints the runtime version)
  #[serde(default = "default_runtime_probe")]
  pub runtime: Vec<String>,

  /// Pinned runtime version prefix (e.g. "3.10")
  #[serde(default = "default_runtime_version")]
  pub runtime_version: String,

  /// Package manager executable
  #[serde(default = "default_manager")]
  pub manager: String,

  /// Optional curl-able installer script for the manager
  #[serde(default)]
  pub installer_url: Option<String>,

  /// Directory registered on PATH after the installer runs
  #[serde(default)]
  pub installer_bin_dir: Option<String>,

  /// Arguments telling the manager to keep its environment in-project
  /// (empty = skip the configure step)
  #[serde(default = "default_env_config_args")]
  pub env_config_args: Vec<String>,

  /// Lock file pinning resolved dependency versions (cache-key input)
  #[serde(default = "default_lockfile")]
  pub lockfile: String,

  /// In-project managed environment directory (the cacheable unit)
  #[serde(default = "default_env_dir")]
  pub env_dir: String,

  /// Dependency cache root
  #[serde(default = "default_cache_dir")]
  pub cache_dir: String,

  /// Staging package index URL; production endpoints are rejected
  #[serde(default = "default_index")]
  pub index: String,

  /// Repository name the manager knows the index by
  #[serde(default = "default_index_name")]
  pub index_name: String,

  /// Environment variable carrying the CI-scoped publish token
  #[serde(default = "default_publish_token_env")]
  pub token_env: String,
}

fn default_runtime_probe() -> Vec<String> {
  vec!["python3".to_string(), "--version".to_string()]
}

fn default_runtime_version() -> String {
  "3.10".to_string()
}

fn default_manager() -> String {
  "poetry".to_string()
}

fn default_env_config_args() -> Vec<String> {
  vec![
    "config".to_string(),
    "virtualenvs.in-project".to_string(),
    "true".to_string(),
    "--local".to_string(),
  ]
}

fn default_lockfile() -> String {
  "poetry.lock".to_string()
}

fn default_env_dir() -> String {
  ".venv".to_string()
}

fn default_cache_dir() -> String {
  "~/.cache/slipway".to_string()
}

fn default_index() -> String {
  "https://test.pypi.org/legacy/".to_string()
}

fn default_index_name() -> String {
  "staging".to_string()
}

fn default_publish_token_env() -> String {
  "PUBLISH_TOKEN".to_string()
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      runtime: default_runtime_probe(),
      runtime_version: default_runtime_version(),
      manager: default_manager(),
      installer_url: None,
      installer_bin_dir: None,
      env_config_args: default_env_config_args(),
      lockfile: default_lockfile(),
      env_dir: default_env_dir(),
      cache_dir: default_cache_dir(),
      index: default_index(),
      index_name: default_index_name(),
      token_env: default_publish_token_env(),
    }
  }
}

/// Index hosts that are production publish endpoints
///
/// The publish pipeline is staging-only; a config that aims the CI token at
/// one of these is rejected at load time.
const PRODUCTION_INDEX_HOSTS: &[&str] = &["upload.pypi.org", "://pypi.org", "crates.io/api"];

impl SlipConfig {
  /// Find config file in search order: slipway.toml, .slipway.toml, .config/slipway.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("slipway.toml"),
      path.join(".slipway.toml"),
      path.join(".config").join("slipway.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from slipway.toml (searches multiple locations)
  pub fn load(path: &Path) -> SlipResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      SlipError::Config(ConfigError::NotFound {
        project_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: SlipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Save config to slipway.toml (default location)
  pub fn save(&self, path: &Path) -> SlipResult<()> {
    let config_path = path.join("slipway.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Create a new config with defaults for a named project
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      project: ProjectConfig { name: name.into() },
      release: ReleaseConfig::default(),
      publish: PublishConfig::default(),
    }
  }

  /// Validate the configuration
  pub fn validate(&self) -> SlipResult<()> {
    if self.release.tool.is_empty() {
      return Err(SlipError::Config(ConfigError::MissingField {
        field: "release.tool".to_string(),
      }));
    }

    if self.publish.runtime.is_empty() {
      return Err(SlipError::Config(ConfigError::MissingField {
        field: "publish.runtime".to_string(),
      }));
    }

    validate_version_pin(&self.publish.runtime_version)?;

    for host in PRODUCTION_INDEX_HOSTS {
      if self.publish.index.contains(host) {
        return Err(SlipError::Config(ConfigError::ProductionIndex {
          index: self.publish.index.clone(),
        }));
      }
    }

    Ok(())
  }
}

/// Validate a runtime version pin: `major[.minor[.patch]]`, numeric parts
///
/// Full three-part pins go through semver for strictness; shorter pins are
/// prefix pins and checked component-wise.
fn validate_version_pin(pin: &str) -> SlipResult<()> {
  let parts: Vec<&str> = pin.split('.').collect();

  if parts.len() == 3 {
    semver::Version::parse(pin)
      .map_err(|e| SlipError::message(format!("Invalid runtime_version '{}': {}", pin, e)))?;
    return Ok(());
  }

  if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
    return Err(SlipError::message(format!(
      "Invalid runtime_version '{}'. Use major[.minor[.patch]], e.g. '3.10'",
      pin
    )));
  }

  Ok(())
}
