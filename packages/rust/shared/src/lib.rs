//! Shared types, error model, and configuration for docpress.
//!
//! This crate is the foundation depended on by all other docpress crates.
//! It provides:
//! - [`DocpressError`] — the unified error type
//! - Domain types ([`BuildReport`], [`StepOutcome`], [`BuildId`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GeneratorConfig, IndexConfig, PipelineConfig, SiteConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{DocpressError, Result};
pub use types::{
    BuildId, BuildReport, CURRENT_SCHEMA_VERSION, IndexSummary, StepName, StepOutcome, StepStatus,
};
