//! User-facing progress lines and install banners, written to stdout.
//!
//! Colors come from `console`, which drops them when stdout is not a
//! terminal or `NO_COLOR` is set.

use crate::config::APP_NAME;
use console::{style, StyledObject};
use std::fmt::Display;
use std::path::Path;

pub fn info<D: Display>(text: D) -> StyledObject<D> {
    style(text).cyan()
}

pub fn comment<D: Display>(text: D) -> StyledObject<D> {
    style(text).yellow()
}

pub fn success<D: Display>(text: D) -> StyledObject<D> {
    style(text).green()
}

pub fn error<D: Display>(text: D) -> StyledObject<D> {
    style(text).red()
}

pub fn bold<D: Display>(text: D) -> StyledObject<D> {
    style(text).bold()
}

pub fn line<D: Display>(text: D) {
    println!("{}", text);
}

pub fn pre_message(bin_dir: &Path) {
    line(format!(
        "# Welcome to {package}!\n\n\
         This will download and install the latest version of {package}.\n\n\
         It will add the `{package}` command to {package}'s bin directory, located at:\n\n\
         {home_bin}\n\n\
         You can uninstall at any time by executing this script with the --uninstall option,\n\
         and these changes will be reverted.\n",
        package = info(APP_NAME),
        home_bin = comment(bin_dir.display()),
    ));
}

/// Short form when `bin_dir` is already on `PATH`, otherwise explain how to
/// get it there.
pub fn post_message(version: &str, bin_dir: &Path, on_path: bool) {
    let test_command = bold(format!("{} --version", APP_NAME));
    if on_path {
        line(format!(
            "{package} ({version}) is installed now. {great}\n\n\
             You can test that everything is set up by executing:\n\n\
             `{test_command}`\n",
            package = info(APP_NAME),
            version = bold(version),
            great = success("Great!"),
            test_command = test_command,
        ));
    } else {
        line(format!(
            "{package} ({version}) is installed now. {great}\n\n\
             To get started you need {package}'s bin directory ({home_bin}) in your `PATH`\n\
             environment variable.\n\n\
             Add `export PATH=\"{home_bin}:$PATH\"` to your shell configuration file.\n\n\
             Alternatively, you can call {package} explicitly with `{executable}`.\n\n\
             You can test that everything is set up by executing:\n\n\
             `{test_command}`\n",
            package = info(APP_NAME),
            version = bold(version),
            great = success("Great!"),
            home_bin = comment(bin_dir.display()),
            executable = bold(bin_dir.join(APP_NAME).display()),
            test_command = test_command,
        ));
    }
}

/// `Installing oi (<version>): <message>`
pub fn install_comment(version: &str, message: &str) {
    line(format!(
        "Installing {} ({}): {}",
        info(APP_NAME),
        bold(version),
        comment(message)
    ));
}
