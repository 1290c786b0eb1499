//! Publish pipeline: clean → build → copy → verify.
//!
//! Sequences the task primitives from `docpress-tasks` in their fixed order,
//! records a per-step [`StepOutcome`](docpress_shared::StepOutcome) trail,
//! and persists a [`BuildReport`](docpress_shared::BuildReport) after every
//! run.

pub mod pipeline;
pub mod report;

pub use pipeline::{ProgressReporter, SilentProgress, publish};
pub use report::{report_path, write_report};
