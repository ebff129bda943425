//! At-most-once bookkeeping of required packages and repositories.

/// Insertion-ordered set of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    items: Vec<String>,
}

impl OrderedSet {
    /// Insert `name`; returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.items.push(name.to_string());
        true
    }

    /// Returns `true` if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    /// Names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::default();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Repositories and packages a machine has declared as required.
///
/// The repository list also tracks which entries have been installed in the
/// current pass, so that [`pending_repositories`](Self::pending_repositories)
/// can flush only the new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Required repositories, in declaration order.
    pub repositories: OrderedSet,
    /// Required packages, in declaration order.
    pub dependencies: OrderedSet,
    installed_repositories: OrderedSet,
}

impl Ledger {
    /// Ledger seeded from declared repositories and dependencies.
    ///
    /// Seeded dependencies count as already required; they are installed by
    /// the provisioning plan, not by [`require_package`].
    ///
    /// [`require_package`]: super::Provisioner::require_package
    #[must_use]
    pub fn seeded<'a>(
        repositories: impl IntoIterator<Item = &'a str>,
        dependencies: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            repositories: repositories.into_iter().collect(),
            dependencies: dependencies.into_iter().collect(),
            installed_repositories: OrderedSet::default(),
        }
    }

    /// Record that `name` has been installed.
    pub(crate) fn mark_repository_installed(&mut self, name: &str) {
        self.installed_repositories.insert(name);
    }

    /// Required repositories not yet installed in this pass.
    #[must_use]
    pub fn pending_repositories(&self) -> Vec<String> {
        self.repositories
            .iter()
            .filter(|name| !self.installed_repositories.contains(name))
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_set_keeps_first_insertion() {
        let mut set = OrderedSet::default();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn seeding_drops_duplicates() {
        let ledger = Ledger::seeded(["r1", "r1", "r2"], ["git"]);
        assert_eq!(ledger.repositories.len(), 2);
        assert!(ledger.dependencies.contains("git"));
    }

    #[test]
    fn pending_excludes_installed() {
        let mut ledger = Ledger::seeded(["r1", "r2"], ["git"]);
        ledger.mark_repository_installed("r1");
        assert_eq!(ledger.pending_repositories(), vec!["r2"]);
    }
}
