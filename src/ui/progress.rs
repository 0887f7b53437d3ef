//! Progress reporting for step sequences
//!
//! Uses `linya` for allocation-free progress bars. Both observers plug into
//! the step runner; commands pick one based on output mode.

use crate::core::step::{StepObserver, StepReport, StepStatus};
use linya::{Bar, Progress};

/// Plain per-step console output
///
/// One line per finished step, with the note when the step produced one.
pub struct ConsoleObserver;

impl StepObserver for ConsoleObserver {
  fn on_finish(&mut self, report: &StepReport) {
    match report.status {
      StepStatus::Completed => match &report.note {
        Some(note) => println!("✅ {} ({})", report.name, note),
        None => println!("✅ {}", report.name),
      },
      StepStatus::Skipped => {
        let reason = report.note.as_deref().unwrap_or("skipped");
        println!("⏭️  {} ({})", report.name, reason);
      }
    }
  }
}

/// Progress bar across a step sequence
///
/// The bar is sized lazily on the first step because the observer does not
/// know the step count up front.
pub struct StepProgress {
  label: String,
  progress: Progress,
  bar: Option<Bar>,
}

impl StepProgress {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      progress: Progress::new(),
      bar: None,
    }
  }
}

impl StepObserver for StepProgress {
  fn on_start(&mut self, _index: usize, total: usize, _name: &str) {
    if self.bar.is_none() {
      self.bar = Some(self.progress.bar(total, self.label.clone()));
    }
  }

  fn on_finish(&mut self, _report: &StepReport) {
    if let Some(bar) = &self.bar {
      self.progress.inc_and_draw(bar, 1);
    }
  }
}
