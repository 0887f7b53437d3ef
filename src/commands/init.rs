//! Init command implementation

use crate::core::config::SlipConfig;
use crate::core::context::ProjectContext;
use crate::core::error::{SlipError, SlipResult};

/// Run the init command
pub fn run_init(ctx: &ProjectContext, force: bool) -> SlipResult<()> {
  if SlipConfig::exists(&ctx.root) && !force {
    return Err(SlipError::with_help(
      "slipway.toml already exists.",
      "Pass --force to overwrite it with defaults.",
    ));
  }

  let name = ctx
    .root
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "project".to_string());

  let config = SlipConfig::new(name.as_str());
  config.save(&ctx.root)?;

  println!("✅ Created slipway.toml for '{}'", name);
  println!();
  println!("Next steps:");
  println!("  1. Review [release] - tool, remote, token_path");
  println!("  2. Review [publish] - runtime pin, manager, staging index");
  println!("  3. Run `slipway release --dry-run` to preview the sequence");

  Ok(())
}
