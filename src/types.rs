use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One release as returned by the GitHub releases API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    pub content_type: String,
}

/// Archive flavor to install, matched against an asset's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArtifactKind {
    #[default]
    Gtar,
    Zip,
}

impl ArtifactKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Zip => "application/zip",
            ArtifactKind::Gtar => "application/x-gtar",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Gtar => write!(f, "gtar"),
            ArtifactKind::Zip => write!(f, "zip"),
        }
    }
}

impl GitHubRelease {
    /// First asset whose content type matches `kind` exactly.
    pub fn find_asset(&self, kind: ArtifactKind) -> Option<&GitHubAsset> {
        self.assets
            .iter()
            .find(|asset| asset.content_type == kind.content_type())
    }
}
