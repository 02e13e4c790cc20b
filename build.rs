use std::process::Command;

const VERSION_ENV: &str = "GPGFILE_VERSION";

/// `git describe` of the working tree, if this is a git checkout.
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

fn main() {
    // A release pipeline stamps the version; local builds fall back to git.
    if let Some(version) = std::env::var(VERSION_ENV).ok().or_else(git_version) {
        println!("cargo:rustc-env={VERSION_ENV}={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");
}
