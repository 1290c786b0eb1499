//! Core domain types for docpress build reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the build report format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// BuildId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for build identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub Uuid);

impl BuildId {
    /// Generate a new time-sortable build identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BuildId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Pipeline steps
// ---------------------------------------------------------------------------

/// The four pipeline steps, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Clean,
    Build,
    Copy,
    Verify,
}

impl StepName {
    /// Stable lowercase name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Build => "build",
            Self::Copy => "copy",
            Self::Verify => "verify",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome status of a single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// Step completed successfully.
    Success,
    /// Step ran and failed. For the build step this carries the generator's
    /// exit code when one was available.
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        message: String,
    },
    /// Step did not run (halted pipeline or nothing to do).
    Skipped { reason: String },
}

/// Timing and status record for one executed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Which step this records.
    pub step: StepName,
    /// Success/failure/skip status.
    #[serde(flatten)]
    pub status: StepStatus,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

impl StepOutcome {
    /// True when the step completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self.status, StepStatus::Success)
    }
}

// ---------------------------------------------------------------------------
// IndexSummary
// ---------------------------------------------------------------------------

/// Counts extracted from a validated search index artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Number of indexed documents.
    pub document_count: usize,
    /// Number of distinct body terms.
    pub term_count: usize,
    /// Number of distinct title terms.
    pub title_term_count: usize,
}

// ---------------------------------------------------------------------------
// BuildReport
// ---------------------------------------------------------------------------

/// The `last-build.json` structure written after each pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this build.
    pub id: BuildId,
    /// Generator command line that was run (command + args).
    pub generator: String,
    /// Tool version that produced this report.
    pub tool_version: String,
    /// When the pipeline started.
    pub started_at: DateTime<Utc>,
    /// When the pipeline finished.
    pub finished_at: DateTime<Utc>,
    /// Per-step outcomes, in execution order.
    pub steps: Vec<StepOutcome>,
    /// Summary of the verified search index, when verification ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSummary>,
}

impl BuildReport {
    /// True when every recorded step succeeded or was skipped.
    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .all(|s| !matches!(s.status, StepStatus::Failed { .. }))
    }

    /// The outcome for a given step, if it was recorded.
    pub fn step(&self, name: StepName) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == name)
    }
}
