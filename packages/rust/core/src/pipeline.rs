//! The publish pipeline: clean → build → copy → verify, strictly in order.
//!
//! Each step starts only after the previous one has fully completed. A
//! failed generator run halts the pipeline before `copy` unless
//! `keep_going` is set, in which case the remaining steps run and the
//! failure is carried in the report (the legacy always-publish behavior).

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};

use docpress_shared::{
    BuildId, BuildReport, CURRENT_SCHEMA_VERSION, PipelineConfig, Result, StepName, StepOutcome,
    StepStatus,
};

use crate::report;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a step starts.
    fn step(&self, step: StepName);
    /// Called when the pipeline completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _step: StepName) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full publish pipeline and persist the build report.
///
/// Hard failures (filesystem errors, a generator that cannot be spawned)
/// propagate as `Err`. A generator that runs and exits non-zero is recorded
/// in the report instead; callers decide what a failed report means for
/// their exit status.
#[instrument(skip_all, fields(command = %config.command, publish = %config.publish_dir.display()))]
pub async fn publish(
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let started_at = Utc::now();
    let id = BuildId::new();
    let mut steps: Vec<StepOutcome> = Vec::with_capacity(4);
    let mut index_summary = None;

    info!(%id, "starting publish pipeline");

    // --- Step 1: clean ---
    progress.step(StepName::Clean);
    let start = Instant::now();
    let clean_stats = docpress_tasks::clean_dir(&config.publish_dir)?;
    steps.push(StepOutcome {
        step: StepName::Clean,
        status: StepStatus::Success,
        elapsed_ms: start.elapsed().as_millis() as u64,
    });
    info!(
        files = clean_stats.files_removed,
        dirs = clean_stats.dirs_removed,
        "clean finished"
    );

    // --- Step 2: build ---
    progress.step(StepName::Build);
    let outcome = docpress_tasks::run_generator(&config.command, &config.args, &config.source_dir)?;
    let command_line = outcome.command_line.clone();
    let build_failed = !outcome.success;
    steps.push(StepOutcome {
        step: StepName::Build,
        status: if outcome.success {
            StepStatus::Success
        } else {
            StepStatus::Failed {
                exit_code: outcome.exit_code,
                message: outcome.failure_message(),
            }
        },
        elapsed_ms: outcome.elapsed.as_millis() as u64,
    });

    if build_failed && !config.keep_going {
        warn!(command = %command_line, "build failed, halting pipeline");
        for step in [StepName::Copy, StepName::Verify] {
            steps.push(StepOutcome {
                step,
                status: StepStatus::Skipped {
                    reason: "pipeline halted by build failure".into(),
                },
                elapsed_ms: 0,
            });
        }
        return finalize(config, progress, id, started_at, steps, None, command_line);
    }

    if build_failed {
        warn!(command = %command_line, "build failed, continuing (keep_going)");
    }

    // --- Step 3: copy ---
    progress.step(StepName::Copy);
    let start = Instant::now();
    let copy_stats = docpress_tasks::copy_tree(&config.build_dir, &config.publish_dir)?;
    steps.push(StepOutcome {
        step: StepName::Copy,
        status: StepStatus::Success,
        elapsed_ms: start.elapsed().as_millis() as u64,
    });
    info!(
        copied = copy_stats.files_copied,
        unchanged = copy_stats.files_unchanged,
        "copy finished"
    );

    // --- Step 4: verify index ---
    progress.step(StepName::Verify);
    let start = Instant::now();
    let index_path = config.index_path();
    let verify_status = if !config.verify_index {
        StepStatus::Skipped {
            reason: "index verification disabled".into(),
        }
    } else if !index_path.exists() {
        StepStatus::Skipped {
            reason: format!("no index artifact at '{}'", index_path.display()),
        }
    } else {
        match docpress_searchindex::validate_file(&index_path) {
            Ok(summary) => {
                info!(
                    documents = summary.document_count,
                    terms = summary.term_count,
                    "index verified"
                );
                index_summary = Some(summary);
                StepStatus::Success
            }
            Err(e) => {
                warn!(path = %index_path.display(), error = %e, "index verification failed");
                StepStatus::Failed {
                    exit_code: None,
                    message: e.to_string(),
                }
            }
        }
    };
    steps.push(StepOutcome {
        step: StepName::Verify,
        status: verify_status,
        elapsed_ms: start.elapsed().as_millis() as u64,
    });

    finalize(config, progress, id, started_at, steps, index_summary, command_line)
}

/// Assemble the report, persist it, and notify the reporter.
fn finalize(
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
    id: BuildId,
    started_at: chrono::DateTime<Utc>,
    steps: Vec<StepOutcome>,
    index: Option<docpress_shared::IndexSummary>,
    generator: String,
) -> Result<BuildReport> {
    let report = BuildReport {
        schema_version: CURRENT_SCHEMA_VERSION,
        id,
        generator,
        tool_version: config.tool_version.clone(),
        started_at,
        finished_at: Utc::now(),
        steps,
        index,
    };

    report::write_report(&config.project_root, &report)?;
    progress.done(&report);

    info!(
        id = %report.id,
        success = report.is_success(),
        "publish pipeline complete"
    );

    Ok(report)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    /// Pipeline config over a temp project, with `script` as the generator.
    fn test_config(root: &Path, script: &str) -> PipelineConfig {
        PipelineConfig {
            project_root: root.to_path_buf(),
            source_dir: root.to_path_buf(),
            build_dir: root.join("_book"),
            publish_dir: root.join("docs"),
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
            keep_going: false,
            verify_index: true,
            index_file: "searchindex.js".into(),
            tool_version: "0.0.0-test".into(),
        }
    }

    fn statuses(report: &BuildReport) -> Vec<StepName> {
        report.steps.iter().map(|s| s.step).collect()
    }

    #[tokio::test]
    async fn publish_runs_steps_in_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(
            tmp.path(),
            "mkdir -p _book && printf '<h1>hi</h1>' > _book/index.html",
        );

        let report = publish(&config, &SilentProgress).await.expect("publish");

        assert!(report.is_success());
        assert_eq!(
            statuses(&report),
            vec![StepName::Clean, StepName::Build, StepName::Copy, StepName::Verify]
        );
        assert!(tmp.path().join("docs/index.html").exists());
        // No index artifact was generated, so verify is a skip
        assert!(matches!(
            report.step(StepName::Verify).unwrap().status,
            StepStatus::Skipped { .. }
        ));
    }

    #[tokio::test]
    async fn clean_purges_stale_output_first() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("stale.html"), "old").unwrap();

        let config = test_config(
            tmp.path(),
            "mkdir -p _book && printf fresh > _book/new.html",
        );
        let report = publish(&config, &SilentProgress).await.expect("publish");

        assert!(report.is_success());
        assert!(!docs.join("stale.html").exists());
        assert!(docs.join("new.html").exists());
    }

    #[tokio::test]
    async fn failed_build_halts_before_copy() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(
            tmp.path(),
            "mkdir -p _book && printf x > _book/partial.html && exit 2",
        );

        let report = publish(&config, &SilentProgress).await.expect("publish");

        assert!(!report.is_success());
        match &report.step(StepName::Build).unwrap().status {
            StepStatus::Failed { exit_code, .. } => assert_eq!(*exit_code, Some(2)),
            other => panic!("expected failed build, got {other:?}"),
        }
        assert!(matches!(
            report.step(StepName::Copy).unwrap().status,
            StepStatus::Skipped { .. }
        ));
        // Nothing was published
        assert!(!tmp.path().join("docs/partial.html").exists());
    }

    #[tokio::test]
    async fn keep_going_publishes_despite_failure() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(
            tmp.path(),
            "mkdir -p _book && printf x > _book/partial.html && exit 2",
        );
        config.keep_going = true;

        let report = publish(&config, &SilentProgress).await.expect("publish");

        // Failure is still recorded, but copy ran (the legacy behavior)
        assert!(!report.is_success());
        assert!(report.step(StepName::Copy).unwrap().is_success());
        assert!(tmp.path().join("docs/partial.html").exists());
    }

    #[tokio::test]
    async fn verify_validates_generated_index() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let fixture = std::fs::canonicalize("../../../fixtures/index/searchindex.fixture.js")
            .expect("fixture path");
        let config = test_config(
            tmp.path(),
            &format!("mkdir -p _book && cp '{}' _book/searchindex.js", fixture.display()),
        );

        let report = publish(&config, &SilentProgress).await.expect("publish");

        assert!(report.is_success());
        assert!(report.step(StepName::Verify).unwrap().is_success());
        let summary = report.index.expect("index summary");
        assert_eq!(summary.document_count, 5);
    }

    #[tokio::test]
    async fn corrupt_index_fails_verify_step() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(
            tmp.path(),
            "mkdir -p _book && printf 'Search.setIndex({docnames:[\"a\"],filenames:[\"a.md\"],terms:{x:5},titles:[\"A\"]})' > _book/searchindex.js",
        );

        let report = publish(&config, &SilentProgress).await.expect("publish");

        assert!(!report.is_success());
        match &report.step(StepName::Verify).unwrap().status {
            StepStatus::Failed { message, .. } => assert!(message.contains("position 5")),
            other => panic!("expected failed verify, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn report_is_persisted() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(tmp.path(), "mkdir -p _book");

        let report = publish(&config, &SilentProgress).await.expect("publish");

        let path = crate::report::report_path(tmp.path());
        assert!(path.exists());
        let content = std::fs::read_to_string(path).unwrap();
        let parsed: BuildReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.id, report.id);
    }
}
