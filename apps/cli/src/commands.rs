//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docpress_core::ProgressReporter;
use docpress_shared::{
    AppConfig, BuildReport, PipelineConfig, StepName, StepStatus, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docpress — build and publish documentation sites.
#[derive(Parser)]
#[command(
    name = "docpress",
    version,
    about = "Orchestrate the clean/build/copy publish cycle of a documentation site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(short = 'C', long, global = true)]
    pub project: Option<PathBuf>,

    /// Explicit config file (overrides project/user config lookup).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Purge the publish directory.
    Clean,

    /// Run the external documentation generator.
    Build,

    /// Copy the generator's output into the publish directory.
    Copy,

    /// Run the full pipeline: clean, build, copy, verify.
    Publish {
        /// Continue to copy even if the generator fails (legacy behavior).
        #[arg(long)]
        keep_going: bool,

        /// Skip search index verification.
        #[arg(long)]
        no_verify: bool,
    },

    /// Validate a search index artifact.
    Verify {
        /// Index file (defaults to the configured location in the publish directory).
        path: Option<PathBuf>,

        /// Look up a token and list the documents containing it.
        #[arg(long)]
        term: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default docpress.toml into the project root.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let project_root = match &cli.project {
        Some(p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    let app_config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(&project_root)?,
    };

    let pipeline = PipelineConfig::from_app_config(
        &app_config,
        &project_root,
        env!("CARGO_PKG_VERSION"),
    );

    match cli.command {
        Command::Clean => cmd_clean(&pipeline),
        Command::Build => cmd_build(&pipeline),
        Command::Copy => cmd_copy(&pipeline),
        Command::Publish {
            keep_going,
            no_verify,
        } => cmd_publish(pipeline, keep_going, no_verify).await,
        Command::Verify { path, term } => cmd_verify(&pipeline, path.as_deref(), term.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&project_root),
            ConfigAction::Show => cmd_config_show(&app_config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_clean(config: &PipelineConfig) -> Result<()> {
    let stats = docpress_tasks::clean_dir(&config.publish_dir)?;
    println!(
        "Cleaned {} ({} files, {} directories removed)",
        config.publish_dir.display(),
        stats.files_removed,
        stats.dirs_removed
    );
    Ok(())
}

fn cmd_build(config: &PipelineConfig) -> Result<()> {
    let outcome =
        docpress_tasks::run_generator(&config.command, &config.args, &config.source_dir)?;

    // A non-zero generator exit fails this command.
    if !outcome.success {
        return Err(eyre!(outcome.failure_message()));
    }

    println!(
        "Build finished in {:.1}s ({})",
        outcome.elapsed.as_secs_f64(),
        outcome.command_line
    );
    Ok(())
}

fn cmd_copy(config: &PipelineConfig) -> Result<()> {
    let stats = docpress_tasks::copy_tree(&config.build_dir, &config.publish_dir)?;
    println!(
        "Copied {} files into {} ({} unchanged, {} bytes)",
        stats.files_copied,
        config.publish_dir.display(),
        stats.files_unchanged,
        stats.bytes_copied
    );
    Ok(())
}

async fn cmd_publish(mut config: PipelineConfig, keep_going: bool, no_verify: bool) -> Result<()> {
    if keep_going {
        config.keep_going = true;
    }
    if no_verify {
        config.verify_index = false;
    }

    info!(
        command = %config.command,
        publish = %config.publish_dir.display(),
        "publishing site"
    );

    let reporter = CliProgress::new();
    let report = docpress_core::publish(&config, &reporter).await?;

    print_report_summary(&report);

    if let Some(failure) = first_failure(&report) {
        return Err(eyre!(failure));
    }

    Ok(())
}

fn cmd_verify(config: &PipelineConfig, path: Option<&Path>, term: Option<&str>) -> Result<()> {
    let index_path = match path {
        Some(p) => p.to_path_buf(),
        None => config.index_path(),
    };

    let index = docpress_searchindex::load(&index_path)?;
    docpress_searchindex::validate(&index)?;
    let summary = docpress_searchindex::summarize(&index);

    println!(
        "{}: OK ({} documents, {} terms, {} title terms)",
        index_path.display(),
        summary.document_count,
        summary.term_count,
        summary.title_term_count
    );

    if let Some(token) = term {
        match index.docs_with_term(token) {
            Some(hits) => {
                println!("Documents containing '{token}':");
                for hit in hits {
                    match hit.title {
                        Some(title) => println!("  [{}] {} — {title}", hit.position, hit.docname),
                        None => println!("  [{}] {}", hit.position, hit.docname),
                    }
                }
            }
            None => println!("Token '{token}' is not in the index."),
        }
    }

    Ok(())
}

fn cmd_config_init(project_root: &Path) -> Result<()> {
    let path = docpress_shared::init_config(project_root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, step: StepName) {
        let message = match step {
            StepName::Clean => "Cleaning publish directory",
            StepName::Build => "Running documentation generator",
            StepName::Copy => "Copying build output",
            StepName::Verify => "Verifying search index",
        };
        self.spinner.set_message(message);
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Summary output
// ---------------------------------------------------------------------------

/// Print the aligned post-publish summary block.
fn print_report_summary(report: &BuildReport) {
    println!();
    if report.is_success() {
        println!("  Site published successfully!");
    } else {
        println!("  Publish finished with failures.");
    }
    println!("  Build:     {}", report.id);
    println!("  Generator: {}", report.generator);
    for step in &report.steps {
        let status = match &step.status {
            StepStatus::Success => format!("ok ({} ms)", step.elapsed_ms),
            StepStatus::Failed { message, .. } => format!("FAILED — {message}"),
            StepStatus::Skipped { reason } => format!("skipped — {reason}"),
        };
        println!("  {:<10} {status}", format!("{}:", step.step));
    }
    if let Some(index) = &report.index {
        println!(
            "  Index:     {} documents, {} terms",
            index.document_count, index.term_count
        );
    }
    println!();
}

/// The first failed step's message, if any.
fn first_failure(report: &BuildReport) -> Option<String> {
    report.steps.iter().find_map(|s| match &s.status {
        StepStatus::Failed { message, .. } => Some(message.clone()),
        _ => None,
    })
}
