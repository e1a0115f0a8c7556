use crate::cli::Cli;
use crate::config::{GitHubSettings, InstallPaths};
use crate::types::ArtifactKind;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["oi-installer"]).unwrap();
    let options = cli.install_options();

    assert_eq!(options.artifact_kind, ArtifactKind::Gtar);
    assert!(!options.force);
    assert!(!options.allow_prereleases);
    assert!(options.version.is_none());
    assert!(!cli.global);
    assert!(!cli.uninstall);
}

#[test]
fn test_cli_flags() {
    let cli = Cli::try_parse_from([
        "oi-installer",
        "-a",
        "zip",
        "--force",
        "-g",
        "--allow-prereleases",
        "--version",
        "v2.1.0",
        "-vv",
    ])
    .unwrap();
    let options = cli.install_options();

    assert_eq!(options.artifact_kind, ArtifactKind::Zip);
    assert!(options.force);
    assert!(options.allow_prereleases);
    assert_eq!(options.version.as_deref(), Some("v2.1.0"));
    assert!(cli.global);
    assert_eq!(cli.verbose, 2);
}

#[test]
fn test_cli_rejects_unknown_artifact_type() {
    assert!(Cli::try_parse_from(["oi-installer", "--artifact-type", "rpm"]).is_err());
}

#[test]
fn test_cli_version_requires_value() {
    assert!(Cli::try_parse_from(["oi-installer", "--version"]).is_err());
}

#[test]
fn test_install_paths_layout() {
    let paths = InstallPaths::new("/opt/bin", "/opt/lib");

    assert_eq!(paths.payload_dir(), PathBuf::from("/opt/lib/oi"));
    assert_eq!(paths.version_file(), PathBuf::from("/opt/lib/oi/version.sh"));
    assert_eq!(paths.entry_point(), PathBuf::from("/opt/bin/oi"));
    assert_eq!(paths.executable(), PathBuf::from("/opt/lib/oi/oi"));
}

#[test]
fn test_github_settings_default() {
    let settings = GitHubSettings::default();
    assert_eq!(settings.api_url, "https://api.github.com/repos/finleyfamily/oi");
    assert!(settings.token.is_none());
}
