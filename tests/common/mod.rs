// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed provisioning project and a fluent
// builder so each integration test can lay out settings and scripts without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use smart_provision::config::{self, Layout};
use smart_provision::logging::MemoryLog;
use smart_provision::provision::Provisioner;
use smart_provision::resolve::Registry;

/// An isolated provisioning project backed by a [`tempfile::TempDir`].
pub struct TestProject {
    /// Temporary directory containing the project.
    pub root: tempfile::TempDir,
}

impl TestProject {
    /// Create an empty project with a `config/` directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("config")).expect("create config dir");
        Self { root }
    }

    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Layout rooted at this project.
    pub fn layout(&self) -> Layout {
        Layout::new(self.root.path())
    }

    /// Write `config/<machine>.yaml`.
    #[must_use]
    pub fn with_settings(self, machine: &str, yaml: &str) -> Self {
        let path = self.layout().settings_file(machine);
        std::fs::write(path, yaml).expect("write settings");
        self
    }

    /// Write a project-relative file, creating parent directories.
    #[must_use]
    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, contents).expect("write file");
        self
    }

    /// Load `machine` and build its provisioner against `registry`.
    pub fn provisioner(&self, machine: &str, registry: Registry) -> (Provisioner, Arc<MemoryLog>) {
        let layout = self.layout();
        let settings = config::load(&layout, machine).expect("load settings");
        let log = Arc::new(MemoryLog::new());
        let provisioner = Provisioner::new(machine, settings, Arc::new(registry), log.clone())
            .with_layout(layout);
        (provisioner, log)
    }
}
