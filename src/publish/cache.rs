//! Dependency cache for the publish pipeline
//!
//! Entries are keyed by OS label, pinned runtime version, and a SHA-256 of
//! the lock file, so any change to resolved dependencies (or the platform)
//! misses cleanly. A miss or an unusable entry is never an error - the
//! pipeline falls back to a full install.

use crate::core::error::{ResultExt, SlipResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Cache key: OS + runtime version + lock-file content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
  os: String,
  runtime: String,
  lock_hash: String,
}

impl CacheKey {
  /// Compute the key for a lock file
  pub fn compute(os: &str, runtime_version: &str, lockfile: &Path) -> SlipResult<Self> {
    let contents = std::fs::read(lockfile)
      .with_context(|| format!("Failed to read lock file {}", lockfile.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let result = hasher.finalize();

    Ok(Self {
      os: os.to_string(),
      runtime: runtime_version.to_string(),
      lock_hash: format!("{:x}", result),
    })
  }

  /// Directory name for this key (short hash, like a CI cache key)
  pub fn dir_name(&self) -> String {
    format!("{}-{}-{}", self.os, self.runtime, &self.lock_hash[..16.min(self.lock_hash.len())])
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.dir_name())
  }
}

/// Filesystem dependency cache
pub struct DepCache {
  root: PathBuf,
}

impl DepCache {
  /// Open (or lazily create) a cache rooted at `root`
  pub fn open(root: PathBuf) -> Self {
    Self { root }
  }

  /// Path of the entry for a key
  pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
    self.root.join("deps").join(key.dir_name())
  }

  /// Whether an entry exists for the key
  pub fn has_entry(&self, key: &CacheKey) -> bool {
    self.entry_path(key).is_dir()
  }

  /// Restore an entry into `env_dir`; returns false on a miss
  pub fn restore(&self, key: &CacheKey, env_dir: &Path) -> SlipResult<bool> {
    let entry = self.entry_path(key);
    if !entry.is_dir() {
      return Ok(false);
    }

    copy_dir_all(&entry, env_dir)
      .with_context(|| format!("Failed to restore cache entry {}", key))?;
    Ok(true)
  }

  /// Save `env_dir` as the entry for a key (replaces any previous entry)
  pub fn save(&self, key: &CacheKey, env_dir: &Path) -> SlipResult<()> {
    let entry = self.entry_path(key);
    if entry.exists() {
      std::fs::remove_dir_all(&entry)?;
    }
    if let Some(parent) = entry.parent() {
      std::fs::create_dir_all(parent)?;
    }

    copy_dir_all(env_dir, &entry).with_context(|| format!("Failed to save cache entry {}", key))?;
    Ok(())
  }
}

/// Remove a restored environment that failed its liveness probe
pub fn discard_env(env_dir: &Path) -> SlipResult<()> {
  if env_dir.exists() {
    std::fs::remove_dir_all(env_dir)
      .with_context(|| format!("Failed to discard environment {}", env_dir.display()))?;
  }
  Ok(())
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
  std::fs::create_dir_all(dst)?;
  for entry in std::fs::read_dir(src)? {
    let entry = entry?;
    let target = dst.join(entry.file_name());
    if entry.file_type()?.is_dir() {
      copy_dir_all(&entry.path(), &target)?;
    } else {
      std::fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}
