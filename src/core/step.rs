//! Fail-fast sequential step runner
//!
//! Both procedures are an explicit ordered list of fallible steps: the runner
//! executes them in order, records an outcome per step, and stops at the
//! first error, which propagates unchanged. No retries, no partial-success
//! aggregation.

use crate::core::error::SlipResult;
use serde::Serialize;

/// Result of one executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
  /// Step ran and succeeded
  Completed,
  /// Step decided it had nothing to do (e.g. cache miss on restore)
  Skipped,
}

/// Record of one step for the run report
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub name: String,
  pub status: StepStatus,
  /// Optional one-line note (skip reason, probe detail)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
  pub duration_ms: u128,
}

/// Outcome returned by a step body
pub struct StepOutcome {
  pub status: StepStatus,
  pub note: Option<String>,
}

impl StepOutcome {
  pub fn completed() -> Self {
    Self {
      status: StepStatus::Completed,
      note: None,
    }
  }

  pub fn completed_with(note: impl Into<String>) -> Self {
    Self {
      status: StepStatus::Completed,
      note: Some(note.into()),
    }
  }

  pub fn skipped(reason: impl Into<String>) -> Self {
    Self {
      status: StepStatus::Skipped,
      note: Some(reason.into()),
    }
  }
}

/// A named fallible step over shared pipeline state `S`
pub struct Step<'a, S> {
  pub name: &'static str,
  pub run: Box<dyn FnOnce(&mut S) -> SlipResult<StepOutcome> + 'a>,
}

impl<'a, S> Step<'a, S> {
  pub fn new<F>(name: &'static str, run: F) -> Self
  where
    F: FnOnce(&mut S) -> SlipResult<StepOutcome> + 'a,
  {
    Self { name, run: Box::new(run) }
  }
}

/// Observer hook for step lifecycle (progress bars, plain println)
pub trait StepObserver {
  fn on_start(&mut self, _index: usize, _total: usize, _name: &str) {}
  fn on_finish(&mut self, _report: &StepReport) {}
}

/// No-op observer for quiet/JSON runs
pub struct SilentObserver;

impl StepObserver for SilentObserver {}

/// Run steps in order, fail-fast
///
/// Returns the reports of all steps that ran. On error, the reports gathered
/// so far are discarded with the error; the native stderr of the failed
/// subprocess is already inside the error.
pub fn run_steps<S>(
  state: &mut S,
  steps: Vec<Step<'_, S>>,
  observer: &mut dyn StepObserver,
) -> SlipResult<Vec<StepReport>> {
  let total = steps.len();
  let mut reports = Vec::with_capacity(total);

  for (index, step) in steps.into_iter().enumerate() {
    observer.on_start(index, total, step.name);
    let started = std::time::Instant::now();

    let outcome = (step.run)(state)?;

    let report = StepReport {
      name: step.name.to_string(),
      status: outcome.status,
      note: outcome.note,
      duration_ms: started.elapsed().as_millis(),
    };
    observer.on_finish(&report);
    reports.push(report);
  }

  Ok(reports)
}
