//! Subcommand implementations.
pub mod explain;
pub mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, Layout};
use crate::logging::Logger;
use crate::provision::Provisioner;
use crate::resolve::Registry;

/// Environment variable that overrides the project root.
pub const ROOT_ENV: &str = "SMART_PROVISION_ROOT";

/// Resolve the project root: `--root`, then `SMART_PROVISION_ROOT`, then the
/// current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }
    if let Ok(root) = std::env::var(ROOT_ENV)
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir().context("determining current directory")?;
    Ok(dunce::simplified(&cwd).to_path_buf())
}

/// Load the settings of `machine` and build its provisioner with the
/// built-in units.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the settings cannot
/// be loaded.
pub fn setup(global: &GlobalOpts, machine: &str) -> Result<Provisioner> {
    setup_with(global, machine, Registry::with_builtin())
}

/// Like [`setup`], with a caller-built registry.
///
/// Plugin units and script callbacks are compiled in; an embedding binary
/// registers its own before calling this.  Declared plugins with no
/// registered units are reported as warnings.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or the settings cannot
/// be loaded.
pub fn setup_with(global: &GlobalOpts, machine: &str, registry: Registry) -> Result<Provisioner> {
    let root = resolve_root(global)?;
    let layout = Layout::new(root);
    let log = Logger::new(machine);

    log.stage("Loading settings");
    let settings = config::load(&layout, machine)?;
    log.debug(&format!(
        "os {} {}, {} plugins, {} packages",
        settings.os,
        settings.version,
        settings.plugins.len(),
        settings.packages.len()
    ));

    for plugin in settings.plugins.iter().filter(|p| !registry.has_plugin(p)) {
        log.warn(&format!("plugin '{plugin}' has no registered units"));
    }

    let registry = Arc::new(registry);
    Ok(Provisioner::new(machine, settings, registry, Arc::new(log)).with_layout(layout))
}
