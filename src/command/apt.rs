//! Debian-family (`apt-get`) command dialect.
use super::{Action, CommandBuilder, shell};
use crate::platform::OsFamily;

/// Command builder for Debian, Ubuntu and derivatives.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptCommand;

impl AptCommand {
    /// Normalise a repository name for `add-apt-repository`.
    ///
    /// A bare `owner/name` is a Launchpad PPA; anything with a scheme or a
    /// full `deb ...` line is passed through unchanged.
    fn repo_spec(name: &str) -> String {
        if name.contains(':') || name.starts_with("deb ") || !name.contains('/') {
            name.to_string()
        } else {
            format!("ppa:{name}")
        }
    }
}

impl CommandBuilder for AptCommand {
    fn family(&self) -> OsFamily {
        OsFamily::Debian
    }

    fn install(&self, names: &[&str]) -> Action {
        let names: Vec<_> = names.iter().map(|n| shell::quote(n)).collect();
        Action::command(format!(
            "DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
            names.join(" ")
        ))
    }

    fn add_repo(&self, name: &str) -> Action {
        Action::command(format!(
            "add-apt-repository -y {} && apt-get update -y",
            shell::quote(&Self::repo_spec(name))
        ))
    }

    fn update(&self) -> Action {
        Action::command("apt-get update -y")
    }
}
