use std::path::Path;
use std::process::Command;

fn main() {
    // Prefer SMART_PROVISION_VERSION if set (e.g., by a release job),
    // otherwise fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("SMART_PROVISION_VERSION") {
        println!("cargo:rustc-env=SMART_PROVISION_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=SMART_PROVISION_VERSION={version}");
    }

    // The manifest sits at the repository root, so `.git` is a sibling.
    if Path::new(".git").is_dir() {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/refs/");
    }
    println!("cargo:rerun-if-env-changed=SMART_PROVISION_VERSION");
}
