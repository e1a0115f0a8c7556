use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "oi";
pub const GITHUB_REPO: &str = "finleyfamily/oi";
pub const VERSION_FILE_NAME: &str = "version.sh";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Where the entry point and the unpacked payload live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
}

impl InstallPaths {
    pub fn new(bin_dir: impl Into<PathBuf>, lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            lib_dir: lib_dir.into(),
        }
    }

    /// `/usr/local/{bin,lib}` for global installs, `~/.local/{bin,lib}`
    /// otherwise. `OI_BIN_DIR` and `OI_LIB_DIR` override either one.
    pub fn resolve(global_install: bool) -> Result<Self> {
        let (bin_dir, lib_dir) = if global_install {
            (PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/local/lib"))
        } else {
            let home = dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?;
            (home.join(".local").join("bin"), home.join(".local").join("lib"))
        };

        let paths = Self {
            bin_dir: env_path("OI_BIN_DIR").unwrap_or(bin_dir),
            lib_dir: env_path("OI_LIB_DIR").unwrap_or(lib_dir),
        };
        tracing::debug!("Bin directory: {}", paths.bin_dir.display());
        tracing::debug!("Lib directory: {}", paths.lib_dir.display());
        Ok(paths)
    }

    /// `<lib>/oi`
    pub fn payload_dir(&self) -> PathBuf {
        self.lib_dir.join(APP_NAME)
    }

    /// `<lib>/oi/version.sh`
    pub fn version_file(&self) -> PathBuf {
        self.payload_dir().join(VERSION_FILE_NAME)
    }

    /// `<bin>/oi`
    pub fn entry_point(&self) -> PathBuf {
        self.bin_dir.join(APP_NAME)
    }

    /// `<lib>/oi/oi`, the file the entry point links to.
    pub fn executable(&self) -> PathBuf {
        self.payload_dir().join(APP_NAME)
    }

    pub fn bin_dir_on_path(&self) -> bool {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|p| p == self.bin_dir))
            .unwrap_or(false)
    }
}

/// Remote access settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: format!("https://api.github.com/repos/{}", GITHUB_REPO),
            token: None,
        }
    }
}

impl GitHubSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(api_url) = std::env::var("OI_API_URL") {
            if !api_url.is_empty() {
                settings.api_url = api_url.trim_end_matches('/').to_string();
            }
        }

        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                tracing::debug!("Using GITHUB_TOKEN");
                settings.token = Some(token);
            }
        }

        settings
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
