use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=OI_INSTALLER_GIT_COMMIT={}", commit);

    // Release builds are cut from a tag; use it verbatim when present
    if let Some(tags) = git(&["tag", "--points-at", "HEAD"]) {
        if let Some(tag) = tags.lines().next() {
            println!("cargo:rustc-env=OI_INSTALLER_GIT_TAG={}", tag);
        }
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}
