//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ResolveError`]) while the CLI converts them to [`anyhow::Error`] via
//! the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! ConfigError: settings file lookup and parsing
//! ResolveError: script lookup and unit construction
//! ```
//!
//! Resolution errors never abort composition: the resolver logs them and
//! degrades to "not found". They are typed so the log line and tests can
//! name the cause.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while loading machine settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The machine name is empty or contains a path separator.
    #[error("Invalid machine name '{0}'")]
    InvalidMachineName(String),

    /// No settings file exists for the machine.
    #[error("No settings found for machine '{machine}' at {}", .path.display())]
    MissingSettings {
        /// Machine whose settings were requested.
        machine: String,
        /// Path that was probed.
        path: PathBuf,
    },

    /// The settings file is not valid YAML or has the wrong shape.
    #[error("Invalid settings in {}: {source}", .path.display())]
    InvalidSyntax {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_yaml::Error,
    },

    /// An I/O error occurred while reading the settings file.
    #[error("IO error reading settings file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while resolving a name to a handler.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No callback is registered and no `.sh` file exists for a script.
    #[error("No script found for '{0}'")]
    NotFound(String),

    /// A handler is registered but its factory failed.
    #[error("Failed to construct unit {id}: {reason}")]
    Construction {
        /// Unit identifier of the failing factory.
        id: String,
        /// Rendered factory error.
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_invalid_machine_name_display() {
        let e = ConfigError::InvalidMachineName("../web".to_string());
        assert_eq!(e.to_string(), "Invalid machine name '../web'");
    }

    #[test]
    fn config_error_missing_settings_display() {
        let e = ConfigError::MissingSettings {
            machine: "web".to_string(),
            path: PathBuf::from("config/web.yaml"),
        };
        assert_eq!(
            e.to_string(),
            "No settings found for machine 'web' at config/web.yaml"
        );
    }

    #[test]
    fn config_error_invalid_syntax_has_source() {
        use std::error::Error as StdError;
        let source = serde_yaml::from_str::<Vec<String>>("{").expect_err("must fail");
        let e = ConfigError::InvalidSyntax {
            path: PathBuf::from("config/web.yaml"),
            source,
        };
        assert!(e.to_string().starts_with("Invalid settings in config/web.yaml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("config/web.yaml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("IO error reading settings file"));
        assert!(e.to_string().contains("config/web.yaml"));
    }

    #[test]
    fn resolve_error_display() {
        assert_eq!(
            ResolveError::NotFound("swap".to_string()).to_string(),
            "No script found for 'swap'"
        );
        let e = ResolveError::Construction {
            id: "SmartVagrant::Packages::Redis".to_string(),
            reason: "missing setting".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Failed to construct unit SmartVagrant::Packages::Redis: missing setting"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ResolveError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _e: anyhow::Error = ConfigError::InvalidMachineName("x".to_string()).into();
        let _e: anyhow::Error = ResolveError::NotFound("x".to_string()).into();
    }
}
