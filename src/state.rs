use crate::version::VersionCode;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view of the installed version marker.
///
/// The marker ships inside the release payload; nothing here writes it.
#[derive(Debug, Clone)]
pub struct InstallStateStore {
    version_file: PathBuf,
}

impl InstallStateStore {
    pub fn new(version_file: impl Into<PathBuf>) -> Self {
        Self {
            version_file: version_file.into(),
        }
    }

    pub fn version_file(&self) -> &Path {
        &self.version_file
    }

    /// Installed version, or `None` when the marker is missing, unreadable
    /// or holds nothing version-shaped.
    pub fn current(&self) -> Option<VersionCode> {
        let content = match fs::read_to_string(&self.version_file) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(
                    "No readable version marker at {}: {}",
                    self.version_file.display(),
                    e
                );
                return None;
            }
        };

        let version = VersionCode::find(&content);
        match &version {
            Some(v) => tracing::debug!(
                stage = ?v.stage,
                stage_number = %v.stage_number,
                dev = v.dev,
                "Installed version: {}",
                v
            ),
            None => tracing::warn!(
                "Version marker {} does not contain a version",
                self.version_file.display()
            ),
        }
        version
    }
}
