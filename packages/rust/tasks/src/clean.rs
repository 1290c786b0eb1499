//! The `clean` task: purge the publish directory.
//!
//! Removes every entry under the directory (regular files, subdirectories,
//! and dot-files) while keeping the directory itself in place, so a web
//! server pointed at it never sees the path disappear. Read-only entries are
//! made writable and removal is retried once.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use docpress_shared::{DocpressError, Result};

/// Counters from a completed clean run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Regular files and symlinks removed.
    pub files_removed: usize,
    /// Directories removed.
    pub dirs_removed: usize,
}

/// Purge everything under `dir`, keeping (or creating) the directory itself.
///
/// Succeeds when the directory is already empty or does not exist yet.
/// Any deletion failure aborts the task and surfaces to the caller.
pub fn clean_dir(dir: &Path) -> Result<CleanStats> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| DocpressError::io(dir, e))?;
        info!(path = %dir.display(), "publish directory created");
        return Ok(CleanStats::default());
    }

    if !dir.is_dir() {
        return Err(DocpressError::validation(format!(
            "publish path '{}' exists but is not a directory",
            dir.display()
        )));
    }

    let mut stats = CleanStats::default();
    let entries = fs::read_dir(dir).map_err(|e| DocpressError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| DocpressError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| DocpressError::io(&path, e))?;

        if file_type.is_dir() {
            remove_dir_forced(&path)?;
            stats.dirs_removed += 1;
        } else {
            remove_file_forced(&path)?;
            stats.files_removed += 1;
        }
    }

    info!(
        path = %dir.display(),
        files = stats.files_removed,
        dirs = stats.dirs_removed,
        "publish directory cleaned"
    );

    Ok(stats)
}

/// Remove a file, clearing a read-only flag and retrying once on permission
/// failure.
fn remove_file_forced(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "read-only entry, resetting permissions");
            make_writable(path)?;
            fs::remove_file(path).map_err(|e| DocpressError::io(path, e))
        }
        Err(e) => Err(DocpressError::io(path, e)),
    }
}

/// Remove a directory tree, falling back to a per-entry walk that clears
/// read-only flags when the straightforward removal is denied.
fn remove_dir_forced(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            make_writable(path)?;
            let entries = fs::read_dir(path).map_err(|e| DocpressError::io(path, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| DocpressError::io(path, e))?;
                let child = entry.path();
                if entry
                    .file_type()
                    .map_err(|e| DocpressError::io(&child, e))?
                    .is_dir()
                {
                    remove_dir_forced(&child)?;
                } else {
                    remove_file_forced(&child)?;
                }
            }
            fs::remove_dir(path).map_err(|e| DocpressError::io(path, e))
        }
        Err(e) => Err(DocpressError::io(path, e)),
    }
}

/// Clear the read-only bit on `path`.
fn make_writable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| DocpressError::io(path, e))?;
    let mut perms = metadata.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(path, perms).map_err(|e| DocpressError::io(path, e))
}
