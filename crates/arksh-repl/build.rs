//! Build script for arksh-repl.
//!
//! Captures git hash and build date for `--version` output.

use std::process::Command;

fn main() {
    // Only watch .git if it exists (absent in tarball/crate builds)
    if std::path::Path::new("../../.git").exists() {
        println!("cargo::rerun-if-changed=../../.git/HEAD");
        println!("cargo::rerun-if-changed=../../.git/refs/heads/");
    }

    println!("cargo::rerun-if-env-changed=ARKSH_GIT_HASH");

    let git_hash = std::env::var("ARKSH_GIT_HASH")
        .ok()
        .or_else(describe)
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo:rustc-env=ARKSH_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=ARKSH_BUILD_DATE={build_date}");
}

/// Short commit hash, suffixed `-dirty` for uncommitted changes.
fn describe() -> Option<String> {
    Command::new("git")
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
