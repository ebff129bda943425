//! Typed view of a machine's YAML settings.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

/// A file to copy from the host staging area into the guest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CopyEntry {
    /// Bare source path; the destination is derived from it.
    Source(String),
    /// Source with an explicit destination.
    Explicit {
        /// Path under `config/copy/`.
        source: String,
        /// Guest destination, rooted at `/`.
        #[serde(default)]
        dest: Option<String>,
    },
}

impl CopyEntry {
    /// Source path under `config/copy/`.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Source(source) | Self::Explicit { source, .. } => source,
        }
    }

    /// Explicit destination, if any.
    #[must_use]
    pub fn dest(&self) -> Option<&str> {
        match self {
            Self::Source(_) => None,
            Self::Explicit { dest, .. } => dest.as_deref(),
        }
    }
}

/// Settings of one machine, as loaded from `config/<machine>.yaml`.
///
/// Keys the engine understands are typed fields; every other key is kept in
/// [`extra`](Self::extra) for units and scripts to read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    /// Guest OS name (`ubuntu`, `centos`, ...); selects the command dialect.
    #[serde(default)]
    pub os: String,
    /// Guest OS version.
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,
    /// Active plugins, in declaration order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plugins: Vec<String>,
    /// Repositories required up front.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repositories: Vec<String>,
    /// Packages required up front.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: Vec<String>,
    /// Packages to install.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub packages: Vec<String>,
    /// Scripts to run after packages.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scripts: Vec<String>,
    /// Files to copy from the host staging area.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub copy: Vec<CopyEntry>,
    /// Address of the utilities machine; its presence enables utilities.
    #[serde(default)]
    pub ultilities_ip: Option<Value>,
    /// Every other key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Accept `key:` (YAML null) as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `version: 20.04` (a YAML float) as well as a string.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {other:?}"
        ))),
    }
}

impl Settings {
    /// Parse a settings document.
    ///
    /// An empty document yields default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or a known key has
    /// the wrong shape.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Whether the utilities capability flag is set.
    #[must_use]
    pub const fn use_utilities(&self) -> bool {
        self.ultilities_ip.is_some()
    }

    /// Raw value of a free-form key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// String value of a free-form key; numbers and booleans are stringified.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
