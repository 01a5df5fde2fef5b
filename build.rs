use std::process::Command;

/// Short commit hash from git, or `GIT_SHA` when building outside a checkout
fn git_sha() -> Option<String> {
    let from_git = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());

    from_git
        .or_else(|| std::env::var("GIT_SHA").ok())
        .filter(|s| !s.is_empty())
}

fn main() {
    let base = env!("CARGO_PKG_VERSION");

    // Release builds report the bare crate version; everything else carries the commit
    let release = std::env::var_os("APSEMA_RELEASE").is_some();
    let version = match git_sha() {
        Some(sha) if !release => format!("{}+{}", base, sha),
        _ => base.to_string(),
    };

    println!("cargo:rustc-env=APP_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=APSEMA_RELEASE");
    println!("cargo:rerun-if-env-changed=GIT_SHA");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
