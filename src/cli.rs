use crate::install::InstallOptions;
use crate::types::ArtifactKind;
use clap::Parser;

pub fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Release builds carry the tag at HEAD
    if let Some(tag) = option_env!("OI_INSTALLER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("OI_INSTALLER_GIT_COMMIT").unwrap_or("unknown");

    // Leaked once; the client and clap both hold on to it for the whole run
    let version = format!("v{}-{}", BASE_VERSION, commit);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "oi-installer")]
#[command(about = "Installs the latest (or given) version of oi")]
#[command(version = get_version(), disable_version_flag = true)]
pub struct Cli {
    /// Artifact type to download
    #[arg(short, long = "artifact-type", value_enum, default_value_t = ArtifactKind::Gtar)]
    pub artifact_type: ArtifactKind,

    /// Install on top of an existing installation
    #[arg(short, long)]
    pub force: bool,

    /// Install into /usr/local instead of ~/.local
    #[arg(short, long)]
    pub global: bool,

    /// Allow pre-releases to be installed
    #[arg(short = 'p', long)]
    pub allow_prereleases: bool,

    /// Uninstall oi
    #[arg(long)]
    pub uninstall: bool,

    /// Install a specific version (release tag)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            version: self.version.clone(),
            allow_prereleases: self.allow_prereleases,
            force: self.force,
            artifact_kind: self.artifact_type,
        }
    }
}
