//! The override search that maps a package or script name to a handler.
//!
//! Packages are looked up as structured units in the active plugins (last
//! declared first) and then in the base package directory.  A project's
//! `scripts/install_<name>` overrides both.  Scripts are looked up in an
//! ordered list of directories, the project's `scripts/` before the
//! built-in one, preferring a registered callback over a `.sh` file within
//! each directory.  The first match wins.
pub mod naming;
pub mod registry;

pub use registry::{Registry, ScriptFn, Unit, UnitFactory};

use std::fmt;
use std::path::PathBuf;

use crate::config::layout::{BASE_PACKAGES_DIR, plugin_packages_dir};
use crate::error::ResolveError;
use crate::provision::Provisioner;

/// Package directories searched for `plugins`, most specific first.
#[must_use]
pub fn package_search_dirs(plugins: &[String]) -> Vec<String> {
    plugins
        .iter()
        .rev()
        .map(|plugin| plugin_packages_dir(plugin))
        .chain(std::iter::once(BASE_PACKAGES_DIR.to_string()))
        .collect()
}

/// A structured unit built for one package request.
pub struct ResolvedUnit {
    /// Identifier the unit was registered under.
    pub id: String,
    /// The constructed unit.
    pub unit: Box<dyn Unit>,
}

impl fmt::Debug for ResolvedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedUnit")
            .field("id", &self.id)
            .field("name", &self.unit.name())
            .finish()
    }
}

/// Resolve `name` to a structured unit.
///
/// A factory that fails is logged and skipped so that a less specific
/// directory can still supply the package.
#[must_use]
pub fn resolve_package(provisioner: &Provisioner, name: &str) -> Option<ResolvedUnit> {
    for dir in package_search_dirs(&provisioner.context().plugins) {
        let id = naming::package_identifier(&dir, name);
        let Some(factory) = provisioner.registry().unit_factory(&id) else {
            continue;
        };
        match factory(provisioner) {
            Ok(unit) => {
                provisioner.log().debug(&format!("'{name}' resolved to {id}"));
                return Some(ResolvedUnit { id, unit });
            }
            Err(e) => {
                let err = ResolveError::Construction {
                    id,
                    reason: format!("{e:#}"),
                };
                provisioner.log().warn(&err.to_string());
            }
        }
    }
    None
}

/// Where a script request is served from.
#[derive(Clone)]
pub enum ScriptSource {
    /// A registered callback.
    Callback {
        /// `<dir>/<name>` key of the callback.
        key: String,
        /// The callback itself.
        callback: ScriptFn,
    },
    /// A shell script on the host, included verbatim.
    File(PathBuf),
}

impl fmt::Debug for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback { key, .. } => f.debug_tuple("Callback").field(key).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback { key, .. } => write!(f, "callback {key}"),
            Self::File(path) => write!(f, "script {}", path.display()),
        }
    }
}

/// Resolve script `name` against `dirs` in order, preferring a callback
/// over a `.sh` file within each directory.
#[must_use]
pub fn resolve_script(
    provisioner: &Provisioner,
    dirs: &[&str],
    name: &str,
) -> Option<ScriptSource> {
    dirs.iter().find_map(|&dir| {
        if let Some(callback) = provisioner.registry().script(dir, name) {
            return Some(ScriptSource::Callback {
                key: registry::script_key(dir, name),
                callback,
            });
        }
        let path = provisioner.layout().dir(dir).join(format!("{name}.sh"));
        provisioner
            .fs_ops()
            .is_file(&path)
            .then_some(ScriptSource::File(path))
    })
}
