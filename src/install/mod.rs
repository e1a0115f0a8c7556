//! Install, replace and uninstall oi.
//!
//! The [`Installer`] resolves which release to install from the release
//! catalog and the installed marker, then drives download, extraction and
//! publishing. Every step runs to completion before the next one starts.

pub mod github;
pub mod publish;

pub use github::{GitHubClient, ReleaseSource};

use crate::catalog::ReleaseCatalog;
use crate::config::{InstallPaths, APP_NAME};
use crate::download::extract_archive;
use crate::error::InstallError;
use crate::output::{self, info};
use crate::state::InstallStateStore;
use crate::types::{ArtifactKind, GitHubAsset, GitHubRelease};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Directory inside the staging area that receives the unpacked archive.
const STAGED_PAYLOAD: &str = "payload";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Explicit release tag to install instead of the newest one.
    pub version: Option<String>,
    pub allow_prereleases: bool,
    /// Reinstall even when the resolved release is already installed.
    pub force: bool,
    pub artifact_kind: ArtifactKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed { version: String },
    AlreadyInstalled { tag: String },
    Uninstalled { version: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    UpToDate { tag: String },
    Install { tag: String, version: String },
}

pub struct Installer<S> {
    source: S,
    paths: InstallPaths,
    options: InstallOptions,
    state: InstallStateStore,
    catalog: Option<ReleaseCatalog>,
}

impl<S: ReleaseSource> Installer<S> {
    pub fn new(source: S, paths: InstallPaths, options: InstallOptions) -> Self {
        let state = InstallStateStore::new(paths.version_file());
        Self {
            source,
            paths,
            options,
            state,
            catalog: None,
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Release catalog, listed from the source on first use and reused for
    /// the rest of the run.
    pub async fn catalog(&mut self) -> Result<&ReleaseCatalog, InstallError> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => ReleaseCatalog::new(self.source.list_releases().await?),
        };
        Ok(self.catalog.insert(catalog))
    }

    /// Pick the release to install and decide whether anything needs doing.
    pub async fn resolve(&mut self) -> Result<Resolution, InstallError> {
        output::line(info("retrieving releases..."));

        let requested = self.options.version.clone();
        let allow_prereleases = self.options.allow_prereleases;
        let catalog = self.catalog().await?;
        if catalog.is_empty() {
            tracing::warn!("No usable releases were listed");
        }

        let tag = match requested.as_deref() {
            Some(requested) => find_requested(catalog, requested)
                .ok_or_else(|| InstallError::VersionNotFound(requested.to_string()))?
                .tag_name
                .clone(),
            None => catalog
                .select_latest(allow_prereleases)
                .ok_or(InstallError::NoCandidateRelease)?
                .tag_name
                .clone(),
        };
        tracing::debug!("Resolved release {}", tag);

        if !self.options.force {
            if let Some(current) = self.state.current() {
                if current.matches_tag(&tag) {
                    let which = if requested.is_some() { "requested" } else { "latest" };
                    output::line(format!(
                        "The {} version ({}) is already installed",
                        which,
                        output::bold(&tag)
                    ));
                    return Ok(Resolution::UpToDate { tag });
                }
                tracing::info!("Replacing installed version {} with {}", current, tag);
            }
        }

        let version = tag.trim_start_matches('v').to_string();
        Ok(Resolution::Install { tag, version })
    }

    /// Resolve, then download, extract and publish when a change is due.
    pub async fn install(&mut self) -> Result<Outcome, InstallError> {
        output::pre_message(&self.paths.bin_dir);

        let (tag, version) = match self.resolve().await? {
            Resolution::UpToDate { tag } => return Ok(Outcome::AlreadyInstalled { tag }),
            Resolution::Install { tag, version } => (tag, version),
        };

        output::line(format!("Installing {} ({})", info(APP_NAME), info(&version)));

        let artifact = self.find_artifact(&tag, &version).await?;

        // Scratch space for the download; removed on every exit path
        let scratch = TempDir::new()?;
        let archive = scratch.path().join(artifact_file_name(&artifact, &version));
        output::line(format!(
            "Downloading from {}...",
            info(&artifact.browser_download_url)
        ));
        self.source
            .download(&artifact.browser_download_url, &archive)
            .await?;

        fs::create_dir_all(&self.paths.lib_dir)
            .map_err(|e| InstallError::publish(&self.paths.lib_dir, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".oi-staging-")
            .tempdir_in(&self.paths.lib_dir)
            .map_err(|e| InstallError::publish(&self.paths.lib_dir, e))?;

        let unpack_dir = staging.path().join(STAGED_PAYLOAD);
        let extracted = extract_archive(&archive, Some(&unpack_dir))?;
        let staged_payload = extracted.join(APP_NAME);
        if !staged_payload.is_dir() {
            return Err(InstallError::extract(
                &archive,
                format!("archive does not contain a '{}' directory", APP_NAME),
            ));
        }

        let payload_dir = self.paths.payload_dir();
        publish::publish_payload(&staged_payload, staging.path(), &payload_dir)?;

        output::install_comment(
            &version,
            &format!("Symlinking into {}", self.paths.bin_dir.display()),
        );
        let entry_point = self.paths.entry_point();
        publish::link_entry_point(&self.paths.executable(), &entry_point)?;

        output::install_comment(&version, "Complete");
        let on_path = self.paths.bin_dir_on_path();
        output::post_message(&version, &self.paths.bin_dir, on_path);

        Ok(Outcome::Installed { version })
    }

    /// Remove the entry point and the payload. Fails without touching the
    /// filesystem when nothing is installed.
    pub fn uninstall(&self) -> Result<Outcome, InstallError> {
        let payload_dir = self.paths.payload_dir();
        if !payload_dir.exists() {
            return Err(InstallError::NotInstalled);
        }

        tracing::debug!(
            "Reading installed version from {}",
            self.state.version_file().display()
        );
        let version = self.state.current().map(|v| v.release_string());
        match &version {
            Some(v) => output::line(format!(
                "Removing {} ({})",
                info(APP_NAME),
                output::bold(v)
            )),
            None => output::line(format!("Removing {}", info(APP_NAME))),
        }

        let entry_point = self.paths.entry_point();
        if !publish::remove_file_if_exists(&entry_point)? {
            tracing::debug!("No entry point at {}", entry_point.display());
        }
        fs::remove_dir_all(&payload_dir)?;

        Ok(Outcome::Uninstalled { version })
    }

    /// Look the release up by tag and pick the asset of the requested kind.
    async fn find_artifact(
        &self,
        tag: &str,
        version: &str,
    ) -> Result<GitHubAsset, InstallError> {
        let kind = self.options.artifact_kind;
        let release = self.source.release_by_tag(tag).await?;
        release
            .find_asset(kind)
            .cloned()
            .ok_or_else(|| InstallError::ArtifactNotFound {
                version: version.to_string(),
                content_type: kind.content_type().to_string(),
            })
    }
}

/// Exact tag match, retried with a `v` prefix when the request has none.
fn find_requested<'a>(
    catalog: &'a ReleaseCatalog,
    requested: &str,
) -> Option<&'a GitHubRelease> {
    catalog.select_by_tag(requested).or_else(|| {
        if requested.starts_with('v') {
            None
        } else {
            catalog.select_by_tag(&format!("v{}", requested))
        }
    })
}

/// Local file name for a downloaded artifact, never a path.
fn artifact_file_name(artifact: &GitHubAsset, version: &str) -> OsString {
    Path::new(&artifact.name)
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(format!("{}-{}", APP_NAME, version)))
}
