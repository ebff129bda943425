//! Built-in package units.
//!
//! Units are written against the public [`Provisioner`] API only, the same
//! way a plugin's units would be.
//!
//! [`Provisioner`]: crate::provision::Provisioner
pub mod docker;
pub mod nodejs;

use crate::config::layout::BASE_PACKAGES_DIR;
use crate::resolve::Registry;

/// Register every built-in unit into `registry`.
pub fn register_builtin(registry: &mut Registry) {
    registry.register_unit(BASE_PACKAGES_DIR, nodejs::NAME, |p| {
        Ok(Box::new(nodejs::Nodejs::from_provisioner(p)?))
    });
    registry.register_unit(BASE_PACKAGES_DIR, docker::NAME, |p| {
        Ok(Box::new(docker::Docker::from_provisioner(p)))
    });
}
