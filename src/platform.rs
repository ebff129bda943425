use std::fmt;

/// Package-manager family of a guest operating system.
///
/// Every OS name that is not recognised as Debian-derived is treated as
/// RPM-family, matching how machine configs historically only distinguished
/// `ubuntu` from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Debian, Ubuntu and derivatives (`apt-get`).
    Debian,
    /// CentOS, RHEL, Fedora and derivatives (`yum`).
    Rpm,
}

/// OS names that select the Debian family.
const DEBIAN_NAMES: &[&str] = &["ubuntu", "debian", "mint", "elementary", "pop"];

impl OsFamily {
    /// Determine the family from the `os` setting of a machine.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    #[must_use]
    pub fn from_os_name(os: &str) -> Self {
        let os = os.trim().to_ascii_lowercase();
        if DEBIAN_NAMES.contains(&os.as_str()) {
            Self::Debian
        } else {
            Self::Rpm
        }
    }

    /// Returns `true` for the apt family.
    #[must_use]
    pub const fn is_debian(self) -> bool {
        matches!(self, Self::Debian)
    }

    /// Returns `true` for the yum family.
    #[must_use]
    pub const fn is_rpm(self) -> bool {
        matches!(self, Self::Rpm)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Rpm => write!(f, "rpm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubuntu_is_debian() {
        assert_eq!(OsFamily::from_os_name("ubuntu"), OsFamily::Debian);
        assert!(OsFamily::from_os_name("ubuntu").is_debian());
    }

    #[test]
    fn os_name_matching_ignores_case_and_whitespace() {
        assert_eq!(OsFamily::from_os_name("  Ubuntu "), OsFamily::Debian);
        assert_eq!(OsFamily::from_os_name("DEBIAN"), OsFamily::Debian);
    }

    #[test]
    fn centos_is_rpm() {
        assert_eq!(OsFamily::from_os_name("centos"), OsFamily::Rpm);
        assert!(OsFamily::from_os_name("centos").is_rpm());
    }

    #[test]
    fn unknown_and_empty_default_to_rpm() {
        assert_eq!(OsFamily::from_os_name("plan9"), OsFamily::Rpm);
        assert_eq!(OsFamily::from_os_name(""), OsFamily::Rpm);
    }

    #[test]
    fn family_display() {
        assert_eq!(OsFamily::Debian.to_string(), "debian");
        assert_eq!(OsFamily::Rpm.to_string(), "rpm");
    }
}
