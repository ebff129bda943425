//! Docker engine via the upstream convenience script.
use anyhow::Result;

use crate::command::{Action, shell};
use crate::provision::Provisioner;
use crate::resolve::Unit;

/// Package name this unit serves.
pub const NAME: &str = "docker";

const INSTALL_SCRIPT_URL: &str = "https://get.docker.com";

/// Installs Docker and optionally adds `docker_user` to the `docker` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docker {
    user: Option<String>,
}

impl Docker {
    /// Read the optional `docker_user` setting.
    #[must_use]
    pub fn from_provisioner(p: &Provisioner) -> Self {
        Self {
            user: p.settings().get_str("docker_user"),
        }
    }
}

impl Unit for Docker {
    fn name(&self) -> &str {
        NAME
    }

    fn install(&self, p: &mut Provisioner) -> Result<()> {
        p.require_package("curl");
        p.push_install_message(&[NAME], 0);
        let command = p.command_mut();
        command.push(Action::command(format!(
            "curl -fsSL {INSTALL_SCRIPT_URL} | sudo sh"
        )));
        let enable = command.sudo(Action::command("systemctl enable --now docker"));
        command.push(enable);
        if let Some(user) = &self.user {
            let usermod = command.sudo(Action::command(format!(
                "usermod -aG docker {}",
                shell::quote(user)
            )));
            command.push(usermod);
        }
        Ok(())
    }
}
