//! Node.js from the NodeSource repositories.
use anyhow::{Result, bail};

use crate::command::{Action, shell};
use crate::platform::OsFamily;
use crate::provision::Provisioner;
use crate::resolve::Unit;

/// Package name this unit serves.
pub const NAME: &str = "nodejs";

/// Major version installed when `nodejs_version` is not set.
pub const DEFAULT_MAJOR: &str = "18";

/// Installs Node.js at the major version given by `nodejs_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nodejs {
    major: String,
}

impl Nodejs {
    /// Read the requested major version from the machine settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `nodejs_version` is not a plain major version.
    pub fn from_provisioner(p: &Provisioner) -> Result<Self> {
        let major = p
            .settings()
            .get_str("nodejs_version")
            .unwrap_or_else(|| DEFAULT_MAJOR.to_string());
        let major = major.trim().trim_end_matches(".x").to_string();
        if major.is_empty() || !major.chars().all(|c| c.is_ascii_digit()) {
            bail!("nodejs_version must be a major version number, got '{major}'");
        }
        Ok(Self { major })
    }

    fn setup_url(&self, family: OsFamily) -> String {
        let host = match family {
            OsFamily::Debian => "deb.nodesource.com",
            OsFamily::Rpm => "rpm.nodesource.com",
        };
        format!("https://{host}/setup_{}.x", self.major)
    }
}

impl Unit for Nodejs {
    fn name(&self) -> &str {
        NAME
    }

    fn install(&self, p: &mut Provisioner) -> Result<()> {
        p.require_package("curl");
        p.push_install_message(&[NAME], 0);
        let url = self.setup_url(p.context().family);
        let command = p.command_mut();
        command.push(Action::command(format!(
            "curl -fsSL {} | sudo -E bash -",
            shell::quote(&url)
        )));
        let install = command.install(&[NAME]);
        command.push(install);
        Ok(())
    }
}
