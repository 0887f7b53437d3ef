//! Publish command implementation
//!
//! Wraps [`PublishPipeline`]. Human mode drives a progress bar and prints the
//! step summary afterwards; `--json` runs silently and emits the full report.

use crate::core::context::ProjectContext;
use crate::core::error::SlipResult;
use crate::core::exec::Exec;
use crate::core::step::{SilentObserver, StepStatus};
use crate::publish::PublishPipeline;
use crate::ui::progress::StepProgress;

/// Run the publish command
pub fn run_publish(ctx: &ProjectContext, exec: &dyn Exec, json: bool, dry_run: bool) -> SlipResult<()> {
  let config = ctx.require_config()?;
  let pipeline = PublishPipeline::new(exec, &config.publish);

  if dry_run {
    let plan = pipeline.plan();
    if json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      println!("🔍 Publish plan (dry-run, nothing executed):");
      println!();
      for (index, line) in plan.iter().enumerate() {
        println!("  {}. {}", index + 1, line);
      }
    }
    return Ok(());
  }

  if json {
    let report = pipeline.run(&ctx.root, &mut SilentObserver)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("🚀 Publishing '{}' to {}", config.project.name, config.publish.index_name);
  println!();

  let mut progress = StepProgress::new(format!("publish {}", config.project.name));
  let report = pipeline.run(&ctx.root, &mut progress)?;

  println!();
  for step in &report.steps {
    let icon = match step.status {
      StepStatus::Completed => "✅",
      StepStatus::Skipped => "⏭️ ",
    };
    match &step.note {
      Some(note) => println!("{} {} ({})", icon, step.name, note),
      None => println!("{} {}", icon, step.name),
    }
  }

  println!();
  println!("✅ Upload to '{}' completed", config.publish.index_name);

  Ok(())
}
