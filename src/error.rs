use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Version {0} doesn't exist")]
    VersionNotFound(String),

    #[error("Unable to determine a release to use, try passing '--allow-prereleases'.")]
    NoCandidateRelease,

    #[error("Release tag '{0}' not found")]
    ReleaseNotFound(String),

    #[error("Version {version} doesn't have an asset of type '{content_type}'")]
    ArtifactNotFound {
        version: String,
        content_type: String,
    },

    #[error("oi is not currently installed.")]
    NotInstalled,

    #[error("GitHub request to {url} failed: {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to extract {path}: {reason}")]
    Extract { path: PathBuf, reason: String },

    #[error("Failed to publish into {path}: {source}")]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InstallError {
    pub fn extract(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        InstallError::Extract {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn publish(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Publish {
            path: path.into(),
            source,
        }
    }

    /// Expected outcomes of a lookup the user can act on, as opposed to
    /// transport or filesystem failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            InstallError::VersionNotFound(_)
                | InstallError::NoCandidateRelease
                | InstallError::ReleaseNotFound(_)
                | InstallError::ArtifactNotFound { .. }
                | InstallError::NotInstalled
        )
    }
}
