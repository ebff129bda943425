//! Identifier-keyed registry of structured units and script callbacks.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::naming::{package_identifier, unit_identifier};
use crate::config::layout::plugin_packages_dir;
use crate::provision::Provisioner;

/// A structured package handler.
///
/// One instance is built per resolution, used once for [`install`](Self::install)
/// and dropped.
pub trait Unit {
    /// Human-readable name, used in log lines.
    fn name(&self) -> &str;

    /// Append this package's installation actions to `provisioner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit cannot complete; actions it already
    /// appended stay in the sequence.
    fn install(&self, provisioner: &mut Provisioner) -> anyhow::Result<()>;
}

/// Builds a [`Unit`] for one machine.
pub type UnitFactory =
    Arc<dyn Fn(&Provisioner) -> anyhow::Result<Box<dyn Unit>> + Send + Sync>;

/// A compiled-in script, invoked in place of a `.sh` file.
pub type ScriptFn = Arc<dyn Fn(&mut Provisioner) -> anyhow::Result<()> + Send + Sync>;

/// Key of a script callback: `<dir>/<name>` without extension.
#[must_use]
pub fn script_key(dir: &str, name: &str) -> String {
    format!("{}/{name}", dir.trim_end_matches('/'))
}

/// Every handler the resolution chain can dispatch to.
///
/// Built once at startup and shared read-only between machines.
#[derive(Default)]
pub struct Registry {
    units: BTreeMap<String, UnitFactory>,
    scripts: BTreeMap<String, ScriptFn>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in units.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::units::register_builtin(&mut registry);
        registry
    }

    /// Register a unit for package `name` in the package directory `dir`.
    ///
    /// Returns `true` if an earlier factory with the same identifier was
    /// replaced.
    pub fn register_unit<F>(&mut self, dir: &str, name: &str, factory: F) -> bool
    where
        F: Fn(&Provisioner) -> anyhow::Result<Box<dyn Unit>> + Send + Sync + 'static,
    {
        let id = package_identifier(dir, name);
        let replaced = self.units.insert(id.clone(), Arc::new(factory)).is_some();
        if replaced {
            tracing::warn!("unit {id} registered twice, keeping the last registration");
        } else {
            tracing::debug!("registered unit {id}");
        }
        replaced
    }

    /// Register a unit for package `name` supplied by `plugin`.
    pub fn register_plugin_unit<F>(&mut self, plugin: &str, name: &str, factory: F) -> bool
    where
        F: Fn(&Provisioner) -> anyhow::Result<Box<dyn Unit>> + Send + Sync + 'static,
    {
        self.register_unit(&plugin_packages_dir(plugin), name, factory)
    }

    /// Register a script callback for `name` in the script directory `dir`.
    ///
    /// Returns `true` if an earlier callback was replaced.
    pub fn register_script<F>(&mut self, dir: &str, name: &str, callback: F) -> bool
    where
        F: Fn(&mut Provisioner) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let key = script_key(dir, name);
        let replaced = self.scripts.insert(key.clone(), Arc::new(callback)).is_some();
        if replaced {
            tracing::warn!("script {key} registered twice, keeping the last registration");
        }
        replaced
    }

    /// Factory registered under the unit identifier `id`.
    #[must_use]
    pub fn unit_factory(&self, id: &str) -> Option<UnitFactory> {
        self.units.get(id).cloned()
    }

    /// Callback registered for `name` in `dir`.
    #[must_use]
    pub fn script(&self, dir: &str, name: &str) -> Option<ScriptFn> {
        self.scripts.get(&script_key(dir, name)).cloned()
    }

    /// Returns `true` if at least one unit is registered for `plugin`.
    ///
    /// Plugin units are compiled in, so a plugin declared in settings but
    /// absent here contributes nothing.
    #[must_use]
    pub fn has_plugin(&self, plugin: &str) -> bool {
        let prefix = format!("{}::", unit_identifier(&plugin_packages_dir(plugin)));
        self.unit_ids().any(|id| id.starts_with(&prefix))
    }

    /// Registered unit identifiers, sorted.
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Registered script keys, sorted.
    pub fn script_keys(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }
}
