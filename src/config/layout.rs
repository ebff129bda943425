//! Directory layout of a provisioning project.
use std::path::{Path, PathBuf};

/// Project-relative directory of custom (override) scripts.
pub const CUSTOM_SCRIPTS_DIR: &str = "scripts";
/// Built-in scripts run by name.
pub const BUILTIN_SCRIPTS_DIR: &str = "provision/scripts";
/// Built-in package installation scripts.
pub const BUILTIN_INSTALL_DIR: &str = "provision/install";
/// Built-in repository registration scripts.
pub const BUILTIN_REPO_DIR: &str = "provision/apt-repo";
/// Base package units.
pub const BASE_PACKAGES_DIR: &str = "provision/packages";
/// Host-side staging area for queued file copies.
pub const COPY_STAGING_DIR: &str = "config/copy";
/// Where the project root is mounted inside the guest.
pub const DEFAULT_GUEST_ROOT: &str = "/smart-vagrant";

/// Project-relative package directory of a plugin.
#[must_use]
pub fn plugin_packages_dir(plugin: &str) -> String {
    format!("plugins/{plugin}/provision/packages")
}

/// Resolved locations for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    guest_root: String,
}

impl Layout {
    /// Layout rooted at `root` with the default guest mount point.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guest_root: DEFAULT_GUEST_ROOT.to_string(),
        }
    }

    /// Override the guest mount point of the project root.
    #[must_use]
    pub fn with_guest_root(mut self, guest_root: &str) -> Self {
        self.guest_root = guest_root.trim_end_matches('/').to_string();
        self
    }

    /// Project root on the host.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path of a project-relative directory.
    #[must_use]
    pub fn dir(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// `config/<machine>.yaml`.
    #[must_use]
    pub fn settings_file(&self, machine: &str) -> PathBuf {
        self.root.join("config").join(format!("{machine}.yaml"))
    }

    /// Guest path of a file staged under `config/copy/`.
    #[must_use]
    pub fn guest_copy_source(&self, source: &str) -> String {
        format!(
            "{}/{COPY_STAGING_DIR}/{}",
            self.guest_root,
            source.trim_start_matches('/')
        )
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(".")
    }
}
