//! The `build` task: run the external documentation generator.
//!
//! The generator is invoked as a child process in the documentation source
//! directory. Both output streams are captured, forwarded to docpress's own
//! stdout/stderr once the child terminates, and the exit status is reported
//! explicitly so the pipeline can decide whether to halt.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{info, warn};

use docpress_shared::{DocpressError, Result};

/// Result of one generator invocation.
///
/// A non-zero exit is *not* an `Err` at this layer: the task completed and
/// observed the child's status. Converting failure into an error is pipeline
/// policy (`keep_going`).
#[derive(Debug, Clone)]
pub struct GeneratorOutcome {
    /// The command line that was run, for logs and reports.
    pub command_line: String,
    /// Exit code, when the child terminated normally.
    pub exit_code: Option<i32>,
    /// Whether the child reported success.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall-clock duration of the child process.
    pub elapsed: std::time::Duration,
}

impl GeneratorOutcome {
    /// Human-readable failure description for reports and errors.
    pub fn failure_message(&self) -> String {
        match self.exit_code {
            Some(code) => format!("`{}` exited with status {code}", self.command_line),
            None => format!("`{}` was terminated by a signal", self.command_line),
        }
    }
}

/// Run the generator `command` with `args` in `source_dir` and wait for it
/// to terminate.
///
/// Output is buffered while the child runs and forwarded afterwards: stdout
/// to docpress's stdout, stderr to its stderr. Spawn failure (command not
/// found, not executable) is an error naming the command.
pub fn run_generator(command: &str, args: &[String], source_dir: &Path) -> Result<GeneratorOutcome> {
    let command_line = if args.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", args.join(" "))
    };

    info!(command = %command_line, dir = %source_dir.display(), "running generator");
    let start = Instant::now();

    let output = Command::new(command)
        .args(args)
        .current_dir(source_dir)
        .output()
        .map_err(|e| {
            DocpressError::generator(format!(
                "failed to run `{command_line}`: {e}. Is `{command}` installed?"
            ))
        })?;

    let elapsed = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    // Forward the child's output after completion, stream for stream.
    if !stdout.is_empty() {
        print!("{stdout}");
        if !stdout.ends_with('\n') {
            println!();
        }
    }
    if !stderr.is_empty() {
        eprint!("{stderr}");
        if !stderr.ends_with('\n') {
            eprintln!();
        }
    }

    let exit_code = output.status.code();
    let success = output.status.success();

    if success {
        info!(
            command = %command_line,
            elapsed_ms = elapsed.as_millis() as u64,
            "generator finished"
        );
    } else {
        warn!(
            command = %command_line,
            exit_code,
            "generator reported failure"
        );
    }

    Ok(GeneratorOutcome {
        command_line,
        exit_code,
        success,
        stdout,
        stderr,
        elapsed,
    })
}
