//! Filesystem transitions for publishing and removing the oi payload.
//!
//! New payloads are unpacked inside a staging directory that lives in the
//! lib directory, so every move below is a same-filesystem rename.

use crate::error::InstallError;
use std::fs;
use std::io;
use std::path::Path;

const PREVIOUS_PAYLOAD: &str = "previous";

/// Swap `staged` into `target`. Whatever was at `target` is parked inside
/// `staging_root` and goes away with it.
pub fn publish_payload(
    staged: &Path,
    staging_root: &Path,
    target: &Path,
) -> Result<(), InstallError> {
    let parked = staging_root.join(PREVIOUS_PAYLOAD);
    let had_previous = match fs::rename(target, &parked) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(InstallError::publish(target, e)),
    };

    if let Err(e) = fs::rename(staged, target) {
        if had_previous {
            if let Err(restore) = fs::rename(&parked, target) {
                tracing::error!(
                    "Could not restore previous payload at {}: {}",
                    target.display(),
                    restore
                );
            }
        }
        return Err(InstallError::publish(target, e));
    }

    tracing::debug!(
        "Published {} (replaced existing: {})",
        target.display(),
        had_previous
    );
    Ok(())
}

/// Point `entry_point` at `target`. The link is created under a temporary
/// name and renamed over the old one, so the entry point never goes missing.
pub fn link_entry_point(target: &Path, entry_point: &Path) -> Result<(), InstallError> {
    let bin_dir = entry_point.parent().ok_or_else(|| {
        InstallError::publish(
            entry_point,
            io::Error::other("entry point has no parent directory"),
        )
    })?;
    fs::create_dir_all(bin_dir).map_err(|e| InstallError::publish(bin_dir, e))?;

    let file_name = entry_point
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_link = bin_dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));
    remove_file_if_exists(&temp_link).map_err(|e| InstallError::publish(&temp_link, e))?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, &temp_link)
            .map_err(|e| InstallError::publish(&temp_link, e))?;
    }
    #[cfg(not(unix))]
    {
        fs::copy(target, &temp_link).map_err(|e| InstallError::publish(&temp_link, e))?;
        remove_file_if_exists(entry_point).map_err(|e| InstallError::publish(entry_point, e))?;
    }

    if let Err(e) = fs::rename(&temp_link, entry_point) {
        let _ = fs::remove_file(&temp_link);
        return Err(InstallError::publish(entry_point, e));
    }

    tracing::info!(
        "Linked {} -> {}",
        entry_point.display(),
        target.display()
    );
    Ok(())
}

/// Remove a file or symlink; a missing path is not an error.
/// Returns whether anything was removed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
