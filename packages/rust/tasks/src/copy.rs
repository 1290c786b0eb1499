//! The `copy` task: publish the generator's output.
//!
//! Recursively copies every file under the build directory into the publish
//! directory, creating directories as needed. Pre-existing unrelated files
//! in the destination are left alone. Files whose content hash already
//! matches the source are skipped, so re-running with an unchanged build is
//! a no-op.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use docpress_shared::{DocpressError, Result};

/// Counters from a completed copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written to the destination.
    pub files_copied: usize,
    /// Files skipped because the destination already matched.
    pub files_unchanged: usize,
    /// Total bytes written.
    pub bytes_copied: u64,
}

/// Copy the tree rooted at `build_dir` into `publish_dir`.
///
/// A missing `build_dir` is a validation error: nothing has been built yet.
pub fn copy_tree(build_dir: &Path, publish_dir: &Path) -> Result<CopyStats> {
    if !build_dir.is_dir() {
        return Err(DocpressError::validation(format!(
            "build output directory '{}' does not exist — run the build step first",
            build_dir.display()
        )));
    }

    fs::create_dir_all(publish_dir).map_err(|e| DocpressError::io(publish_dir, e))?;

    let mut stats = CopyStats::default();

    for entry in WalkDir::new(build_dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(build_dir).to_path_buf();
            match e.into_io_error() {
                Some(io) => DocpressError::io(path, io),
                None => DocpressError::validation(format!(
                    "walk failed under '{}'",
                    path.display()
                )),
            }
        })?;

        let rel = entry
            .path()
            .strip_prefix(build_dir)
            .expect("walkdir yields paths under its root");
        let target = publish_dir.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| DocpressError::io(&target, e))?;
            continue;
        }

        if target.exists() && file_hash(entry.path())? == file_hash(&target)? {
            debug!(path = %rel.display(), "unchanged, skipping");
            stats.files_unchanged += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| DocpressError::io(parent, e))?;
        }

        let bytes =
            fs::copy(entry.path(), &target).map_err(|e| DocpressError::io(&target, e))?;
        stats.files_copied += 1;
        stats.bytes_copied += bytes;
    }

    info!(
        from = %build_dir.display(),
        to = %publish_dir.display(),
        copied = stats.files_copied,
        unchanged = stats.files_unchanged,
        bytes = stats.bytes_copied,
        "copy complete"
    );

    Ok(stats)
}

/// SHA-256 of a file's contents.
fn file_hash(path: &Path) -> Result<String> {
    let content = fs::read(path).map_err(|e| DocpressError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}
