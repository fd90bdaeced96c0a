use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

/// Stamps `LIP_VERSION` for the user agent and `--version`.
///
/// Packagers may pin it by exporting `LIP_VERSION`; otherwise it comes from
/// `git describe`, with a timestamp suffix for dirty or untagged trees.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=LIP_VERSION");

    let version = match env::var("LIP_VERSION") {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_string(),
        _ => describe_git().unwrap_or_else(|| format!("0.0.0-unknown-{}", timestamp())),
    };

    println!("cargo:rustc-env=LIP_VERSION={}", version);
}

fn describe_git() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let version = described.strip_prefix('v').unwrap_or(described);

    if version.is_empty() || version.ends_with("-dirty") {
        Some(format!("{}-{}", version, timestamp()))
    } else {
        Some(version.to_string())
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
