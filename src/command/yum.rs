//! RPM-family (`yum`) command dialect.
use super::{Action, CommandBuilder, shell};
use crate::platform::OsFamily;

/// Command builder for CentOS, RHEL, Fedora and derivatives.
#[derive(Debug, Clone, Copy, Default)]
pub struct YumCommand;

impl CommandBuilder for YumCommand {
    fn family(&self) -> OsFamily {
        OsFamily::Rpm
    }

    fn install(&self, names: &[&str]) -> Action {
        let names: Vec<_> = names.iter().map(|n| shell::quote(n)).collect();
        Action::command(format!("yum install -y {}", names.join(" ")))
    }

    /// URLs are added as `.repo` sources; bare names are enabled by id.
    fn add_repo(&self, name: &str) -> Action {
        let verb = if name.contains("://") {
            "--add-repo"
        } else {
            "--enable"
        };
        Action::command(format!(
            "yum install -y yum-utils && yum-config-manager {verb} {} && yum makecache -y",
            shell::quote(name)
        ))
    }

    fn update(&self) -> Action {
        Action::command("yum makecache -y")
    }
}
