//! Build report persistence.
//!
//! The report is the pipeline's only durable state. It is written atomically
//! (temp file, then rename) so a crash mid-write never leaves a truncated
//! report behind.

use std::path::{Path, PathBuf};

use tracing::debug;

use docpress_shared::{BuildReport, DocpressError, Result};

/// Directory under the project root holding docpress state.
const STATE_DIR_NAME: &str = ".docpress";

/// Report file name.
const REPORT_FILE_NAME: &str = "last-build.json";

/// Path of the build report for a project: `<root>/.docpress/last-build.json`.
pub fn report_path(project_root: &Path) -> PathBuf {
    project_root.join(STATE_DIR_NAME).join(REPORT_FILE_NAME)
}

/// Write the report to its project location, creating the state directory.
pub fn write_report(project_root: &Path, report: &BuildReport) -> Result<PathBuf> {
    let target = report_path(project_root);
    let dir = target.parent().expect("report path has a parent");
    std::fs::create_dir_all(dir).map_err(|e| DocpressError::io(dir, e))?;

    let content = serde_json::to_string_pretty(report)
        .map_err(|e| DocpressError::validation(format!("failed to serialize report: {e}")))?;

    let temp = dir.join(format!(".{REPORT_FILE_NAME}.tmp"));
    std::fs::write(&temp, content).map_err(|e| DocpressError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| DocpressError::io(&target, e))?;

    debug!(path = %target.display(), "build report written");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docpress_shared::{BuildId, CURRENT_SCHEMA_VERSION, StepName, StepOutcome, StepStatus};

    fn sample_report() -> BuildReport {
        BuildReport {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: BuildId::new(),
            generator: "gitbook build".into(),
            tool_version: "0.1.0".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            steps: vec![StepOutcome {
                step: StepName::Clean,
                status: StepStatus::Success,
                elapsed_ms: 3,
            }],
            index: None,
        }
    }

    #[test]
    fn report_roundtrips_through_disk() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let report = sample_report();

        let path = write_report(tmp.path(), &report).expect("write");
        assert_eq!(path, report_path(tmp.path()));

        let content = std::fs::read_to_string(&path).expect("read back");
        let parsed: BuildReport = serde_json::from_str(&content).expect("parse");
        assert_eq!(parsed.id, report.id);
        assert_eq!(parsed.steps.len(), 1);
    }

    #[test]
    fn write_replaces_previous_report() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_report(tmp.path(), &sample_report()).expect("first write");

        let second = sample_report();
        write_report(tmp.path(), &second).expect("second write");

        let content = std::fs::read_to_string(report_path(tmp.path())).expect("read");
        let parsed: BuildReport = serde_json::from_str(&content).expect("parse");
        assert_eq!(parsed.id, second.id);

        // No temp file left behind
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path().join(STATE_DIR_NAME))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(REPORT_FILE_NAME)]);
    }
}
