use crate::types::GitHubRelease;
use crate::version::VersionCode;

/// Releases ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCatalog {
    releases: Vec<(VersionCode, GitHubRelease)>,
}

impl ReleaseCatalog {
    /// Build the catalog from a raw API listing. Releases whose tag does not
    /// parse as a version are dropped.
    pub fn new(releases: Vec<GitHubRelease>) -> Self {
        let mut parsed: Vec<(VersionCode, GitHubRelease)> = releases
            .into_iter()
            .filter_map(|release| match VersionCode::parse(&release.tag_name) {
                Ok(version) => Some((version, release)),
                Err(e) => {
                    tracing::warn!("Skipping release: {}", e);
                    None
                }
            })
            .collect();

        // Stable sort keeps server order for equal versions
        parsed.sort_by(|(a, _), (b, _)| b.cmp(a));

        tracing::debug!("Release catalog holds {} release(s)", parsed.len());
        Self { releases: parsed }
    }

    pub fn list(&self) -> impl Iterator<Item = &GitHubRelease> {
        self.releases.iter().map(|(_, release)| release)
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Newest release, skipping prereleases unless `allow_prerelease`.
    pub fn select_latest(&self, allow_prerelease: bool) -> Option<&GitHubRelease> {
        self.list()
            .find(|release| allow_prerelease || !release.prerelease)
    }

    pub fn select_by_tag(&self, tag: &str) -> Option<&GitHubRelease> {
        self.list().find(|release| release.tag_name == tag)
    }
}
