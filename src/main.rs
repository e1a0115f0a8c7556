mod catalog;
mod cli;
mod config;
mod download;
mod error;
mod install;
mod output;
mod state;
mod types;
mod version;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{GitHubSettings, InstallPaths};
use error::InstallError;
use install::{GitHubClient, Installer, Outcome};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&cli).await {
        Ok(outcome) => {
            tracing::debug!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<Outcome> {
    let paths = InstallPaths::resolve(cli.global)?;
    let client = GitHubClient::new(GitHubSettings::from_env())?;
    let mut installer = Installer::new(client, paths, cli.install_options());

    let outcome = if cli.uninstall {
        installer.uninstall()?
    } else {
        installer.install().await?
    };
    Ok(outcome)
}

/// Expected failures get a single line; anything else gets the whole chain.
fn report_failure(err: &anyhow::Error) {
    match err.downcast_ref::<InstallError>() {
        Some(e) if e.is_user_facing() => {
            output::line(output::error(e));
        }
        _ => {
            output::line(output::error(format!("{:?}", err)));
            output::line(output::error("Installation failed!"));
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
