//! Machine settings and the project directory layout.
pub mod layout;
pub mod settings;

pub use layout::Layout;
pub use settings::{CopyEntry, Settings};

use std::path::Path;

use crate::error::ConfigError;

/// Load `config/<machine>.yaml` from the project rooted at `layout`.
///
/// # Errors
///
/// Returns an error if the machine name is not a plain file stem, the file
/// does not exist, cannot be read, or is not a valid settings document.
pub fn load(layout: &Layout, machine: &str) -> Result<Settings, ConfigError> {
    if machine.is_empty() || machine.contains(['/', '\\']) || machine == ".." {
        return Err(ConfigError::InvalidMachineName(machine.to_string()));
    }
    let path = layout.settings_file(machine);
    if !path.is_file() {
        return Err(ConfigError::MissingSettings {
            machine: machine.to_string(),
            path,
        });
    }
    load_file(&path)
}

/// Parse a settings document from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::from_yaml(&content).map_err(|source| ConfigError::InvalidSyntax {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;

    /// Write `content` as `config/<machine>.yaml` under a fresh temp root.
    #[allow(clippy::unwrap_used)]
    pub fn write_temp_settings(machine: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("config");
        std::fs::create_dir_all(&conf).unwrap();
        let path = conf.join(format!("{machine}.yaml"));
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }
}
