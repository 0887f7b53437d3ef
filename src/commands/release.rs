//! Release command implementation
//!
//! Thin wrapper over [`ReleaseDriver`]: resolves config, prints the plan in
//! dry-run mode, otherwise runs the sequence with per-step console output.

use crate::core::context::ProjectContext;
use crate::core::error::SlipResult;
use crate::core::exec::Exec;
use crate::release::ReleaseDriver;
use crate::ui::progress::ConsoleObserver;

/// Run the release command
pub fn run_release(
  ctx: &ProjectContext,
  exec: &dyn Exec,
  tool_args: Vec<String>,
  dry_run: bool,
) -> SlipResult<()> {
  let config = ctx.require_config()?;
  let driver = ReleaseDriver::new(exec, &config.release);

  if dry_run {
    println!("🔍 Release plan (dry-run, nothing executed):");
    println!();
    for (index, line) in driver.plan(&tool_args).iter().enumerate() {
      println!("  {}. {}", index + 1, line);
    }
    return Ok(());
  }

  println!("📦 Releasing '{}'", config.project.name);
  println!();

  let reports = driver.run(&ctx.root, &tool_args, &mut ConsoleObserver)?;

  println!();
  println!("✅ Release sequence completed ({} steps)", reports.len());

  Ok(())
}
