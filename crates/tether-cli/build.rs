//! Stamps the binary with the package version and, inside a git checkout,
//! the short commit it was built from.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let Some(commit) = short_commit() {
        version.push('+');
        version.push_str(&commit);
    }

    println!("cargo:rustc-env=TETHER_VERSION={version}");
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let commit = String::from_utf8(output.stdout).ok()?;
    let commit = commit.trim();
    (!commit.is_empty()).then(|| commit.to_owned())
}
