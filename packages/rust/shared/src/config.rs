//! Application configuration for docpress.
//!
//! Project config lives at `<project>/docpress.toml`, with a user-level
//! fallback at `~/.docpress/docpress.toml`. CLI flags override config file
//! values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocpressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docpress";

// ---------------------------------------------------------------------------
// Config structs (matching docpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site directory layout.
    #[serde(default)]
    pub site: SiteConfig,

    /// External generator invocation.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Search index verification.
    #[serde(default)]
    pub index: IndexConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory the generator runs in (the documentation source root).
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// The generator's intermediate output directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Final directory whose contents are served as the website.
    #[serde(default = "default_publish_dir")]
    pub publish_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            build_dir: default_build_dir(),
            publish_dir: default_publish_dir(),
        }
    }
}

fn default_source_dir() -> String {
    ".".into()
}
fn default_build_dir() -> String {
    "_book".into()
}
fn default_publish_dir() -> String {
    "docs".into()
}

/// `[generator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generator command name (e.g., "gitbook").
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments passed to the command.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Continue to the copy step even if the generator exits non-zero.
    #[serde(default)]
    pub keep_going: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            keep_going: false,
        }
    }
}

fn default_command() -> String {
    "gitbook".into()
}
fn default_args() -> Vec<String> {
    vec!["build".into()]
}

/// `[index]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Verify the search index artifact after copy.
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Index file name, relative to the publish directory.
    #[serde(default = "default_index_file")]
    pub file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            verify: true,
            file: default_index_file(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_index_file() -> String {
    "searchindex.js".into()
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags,
/// with all directories resolved against the project root.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Project root all relative directories were resolved against.
    pub project_root: PathBuf,
    /// Directory the generator runs in.
    pub source_dir: PathBuf,
    /// The generator's intermediate output directory.
    pub build_dir: PathBuf,
    /// Final publish directory.
    pub publish_dir: PathBuf,
    /// Generator command name.
    pub command: String,
    /// Generator arguments.
    pub args: Vec<String>,
    /// Continue past a failed generator run.
    pub keep_going: bool,
    /// Verify the search index after copy.
    pub verify_index: bool,
    /// Index file name relative to the publish directory.
    pub index_file: String,
    /// Tool version string recorded in the build report.
    pub tool_version: String,
}

impl PipelineConfig {
    /// Build a runtime config from an [`AppConfig`], resolving relative
    /// directories against `project_root`.
    pub fn from_app_config(config: &AppConfig, project_root: &Path, tool_version: &str) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            source_dir: project_root.join(&config.site.source_dir),
            build_dir: project_root.join(&config.site.build_dir),
            publish_dir: project_root.join(&config.site.publish_dir),
            command: config.generator.command.clone(),
            args: config.generator.args.clone(),
            keep_going: config.generator.keep_going,
            verify_index: config.index.verify,
            index_file: config.index.file.clone(),
            tool_version: tool_version.to_string(),
        }
    }

    /// Absolute path of the search index artifact inside the publish directory.
    pub fn index_path(&self) -> PathBuf {
        self.publish_dir.join(&self.index_file)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user-level config directory (`~/.docpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user-level config file (`~/.docpress/docpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config for a project: `<project_root>/docpress.toml` if present,
/// then the user-level file, then built-in defaults.
pub fn load_config(project_root: &Path) -> Result<AppConfig> {
    let project_file = project_root.join(CONFIG_FILE_NAME);
    if project_file.exists() {
        return load_config_from(&project_file);
    }

    let user_file = config_file_path()?;
    if user_file.exists() {
        return load_config_from(&user_file);
    }

    tracing::debug!(?project_file, "no config file found, using defaults");
    Ok(AppConfig::default())
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocpressError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocpressError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into `dir`, creating it if needed.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocpressError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("publish_dir"));
        assert!(toml_str.contains("gitbook"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.site.build_dir, "_book");
        assert_eq!(parsed.site.publish_dir, "docs");
        assert_eq!(parsed.generator.command, "gitbook");
        assert_eq!(parsed.generator.args, vec!["build".to_string()]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[generator]
command = "sphinx-build"
args = ["-b", "html", "source", "_build/html"]

[site]
build_dir = "_build/html"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.generator.command, "sphinx-build");
        assert_eq!(config.site.build_dir, "_build/html");
        // Untouched sections keep their defaults
        assert_eq!(config.site.publish_dir, "docs");
        assert!(config.index.verify);
        assert!(!config.generator.keep_going);
    }

    #[test]
    fn pipeline_config_resolves_paths() {
        let app = AppConfig::default();
        let root = Path::new("/srv/site");
        let pipeline = PipelineConfig::from_app_config(&app, root, "0.1.0");
        assert_eq!(pipeline.build_dir, root.join("_book"));
        assert_eq!(pipeline.publish_dir, root.join("docs"));
        assert_eq!(pipeline.index_path(), root.join("docs").join("searchindex.js"));
    }

    #[test]
    fn project_config_preferred_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("docpress.toml"),
            "[site]\npublish_dir = \"public\"\n",
        )
        .expect("write config");

        let config = load_config(dir.path()).expect("load");
        assert_eq!(config.site.publish_dir, "public");
    }

    #[test]
    fn init_config_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config(dir.path()).expect("init");
        assert!(path.exists());

        let parsed = load_config_from(&path).expect("reload");
        assert_eq!(parsed.generator.command, "gitbook");
    }
}
