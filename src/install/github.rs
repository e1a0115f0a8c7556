//! GitHub API interaction module
//!
//! Lists releases, fetches a single release by tag and downloads release
//! assets for the oi repository.

use crate::cli::get_version;
use crate::config::{GitHubSettings, GITHUB_API_VERSION};
use crate::download::download_file;
use crate::error::InstallError;
use crate::types::GitHubRelease;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::path::Path;

/// Where releases and their artifacts come from.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    /// Every release of the repository, in server order.
    async fn list_releases(&self) -> Result<Vec<GitHubRelease>, InstallError>;

    async fn release_by_tag(&self, tag: &str) -> Result<GitHubRelease, InstallError>;

    /// Fetch `url` verbatim into `destination`.
    async fn download(&self, url: &str, destination: &Path) -> Result<(), InstallError>;
}

pub struct GitHubClient {
    client: reqwest::Client,
    settings: GitHubSettings,
}

/// Build the API URL listing all releases.
pub fn build_releases_url(api_url: &str) -> String {
    format!("{}/releases", api_url.trim_end_matches('/'))
}

/// Build the API URL for a single release tag.
pub fn build_release_tag_url(api_url: &str, tag: &str) -> String {
    format!("{}/releases/tags/{}", api_url.trim_end_matches('/'), tag)
}

impl GitHubClient {
    pub fn new(settings: GitHubSettings) -> Result<Self, InstallError> {
        let user_agent = format!("oi-installer/{}", get_version());
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, settings })
    }

    fn api_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        if let Some(token) = &self.settings.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("GITHUB_TOKEN contains invalid header characters, ignoring")
                }
            }
        }
        headers
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, InstallError> {
        tracing::debug!("Fetching GitHub release info from: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.api_headers())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(Some(response.json().await?))
    }
}

impl ReleaseSource for GitHubClient {
    async fn list_releases(&self) -> Result<Vec<GitHubRelease>, InstallError> {
        let url = build_releases_url(&self.settings.api_url);
        let releases: Vec<GitHubRelease> = self.get_json(&url).await?.unwrap_or_default();
        tracing::debug!("GitHub returned {} release(s)", releases.len());
        Ok(releases)
    }

    async fn release_by_tag(&self, tag: &str) -> Result<GitHubRelease, InstallError> {
        let url = build_release_tag_url(&self.settings.api_url, tag);
        self.get_json(&url)
            .await?
            .ok_or_else(|| InstallError::ReleaseNotFound(tag.to_string()))
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<(), InstallError> {
        download_file(&self.client, url, destination).await
    }
}
