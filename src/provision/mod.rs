//! Per-machine orchestration of package, repository, script and copy requests.
//!
//! A [`Provisioner`] owns one machine's context and its action sequence.
//! Every request goes through it: the resolution chain is consulted first,
//! and the raw [`CommandBuilder`](crate::command::CommandBuilder) primitives
//! are the fallback when nothing more specific exists.
pub mod ledger;
pub mod plan;

pub use ledger::{Ledger, OrderedSet};
pub use plan::{Summary, provision};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::command::Command;
use crate::config::layout::{
    BUILTIN_INSTALL_DIR, BUILTIN_REPO_DIR, BUILTIN_SCRIPTS_DIR, CUSTOM_SCRIPTS_DIR,
};
use crate::config::{Layout, Settings};
use crate::error::ResolveError;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::platform::OsFamily;
use crate::resolve::{self, Registry, ScriptSource};

const INSTALL_MESSAGE: &str = "Installing: %s ...";

/// Identity and settings of the machine being provisioned.
#[derive(Debug, Clone)]
pub struct MachineContext {
    /// Machine name, as used for `config/<machine>.yaml`.
    pub machine_name: String,
    /// Command dialect selected from [`os`](Self::os).
    pub family: OsFamily,
    /// Guest OS name.
    pub os: String,
    /// Guest OS version.
    pub version: String,
    /// Active plugins, in declaration order.
    pub plugins: Vec<String>,
    /// Full settings, including free-form keys.
    pub settings: Settings,
    /// Whether the utilities capability is enabled.
    pub use_utilities: bool,
    /// Required packages and repositories.
    pub ledger: Ledger,
}

impl MachineContext {
    /// Build the context of `machine_name` from its settings.
    #[must_use]
    pub fn new(machine_name: &str, settings: Settings) -> Self {
        let ledger = Ledger::seeded(
            settings.repositories.iter().map(String::as_str),
            settings.dependencies.iter().map(String::as_str),
        );
        Self {
            machine_name: machine_name.to_string(),
            family: OsFamily::from_os_name(&settings.os),
            os: settings.os.clone(),
            version: settings.version.clone(),
            plugins: settings.plugins.clone(),
            use_utilities: settings.use_utilities(),
            ledger,
            settings,
        }
    }
}

/// Which tier served a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A structured unit, by identifier.
    Unit(String),
    /// A script callback or `.sh` file, by description.
    Script(String),
    /// Nothing specific was found; the raw package-manager command was used.
    Default,
    /// The package was already required; nothing was emitted.
    AlreadyRequired,
    /// No script was found; nothing was emitted.
    Missing,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit(id) => write!(f, "unit {id}"),
            Self::Script(source) => f.write_str(source),
            Self::Default => f.write_str("default command"),
            Self::AlreadyRequired => f.write_str("already required"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

/// Orchestrates provisioning of one machine.
pub struct Provisioner {
    context: MachineContext,
    command: Command,
    registry: Arc<Registry>,
    layout: Layout,
    fs_ops: Arc<dyn FileSystemOps>,
    log: Arc<dyn Log>,
}

impl fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provisioner")
            .field("context", &self.context)
            .field("command", &self.command)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Create a provisioner for `machine_name` rooted at the current directory.
    #[must_use]
    pub fn new(
        machine_name: &str,
        settings: Settings,
        registry: Arc<Registry>,
        log: Arc<dyn Log>,
    ) -> Self {
        let context = MachineContext::new(machine_name, settings);
        let fs_ops: Arc<dyn FileSystemOps> = Arc::new(SystemFileSystemOps);
        let command = Command::new(context.family, Arc::clone(&fs_ops), Arc::clone(&log));
        Self {
            context,
            command,
            registry,
            layout: Layout::default(),
            fs_ops,
            log,
        }
    }

    /// Use `layout` for script lookup and copy staging.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Use `fs_ops` for script lookup and inclusion.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.command.set_fs_ops(Arc::clone(&fs_ops));
        self.fs_ops = fs_ops;
        self
    }

    /// Machine name.
    #[must_use]
    pub fn machine_name(&self) -> &str {
        &self.context.machine_name
    }

    /// Machine identity, settings and ledger.
    #[must_use]
    pub const fn context(&self) -> &MachineContext {
        &self.context
    }

    /// Machine settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.context.settings
    }

    /// The action sequence built so far.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Mutable access to the action sequence, for units and callbacks.
    pub const fn command_mut(&mut self) -> &mut Command {
        &mut self.command
    }

    /// Consume the provisioner, returning its action sequence.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
    }

    /// Handler registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Project layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Filesystem used for script lookup.
    #[must_use]
    pub fn fs_ops(&self) -> &dyn FileSystemOps {
        self.fs_ops.as_ref()
    }

    /// Log sink.
    #[must_use]
    pub fn log(&self) -> &dyn Log {
        self.log.as_ref()
    }

    /// Install package `name` with the most specific handler available.
    ///
    /// Order: `scripts/install_<name>`, plugin and base units, then
    /// `provision/install/install_<name>`, then the raw install command.
    pub fn install_package(&mut self, name: &str) -> Outcome {
        let script = format!("install_{name}");
        if let Some(outcome) = self.dispatch_script(&[CUSTOM_SCRIPTS_DIR], &script) {
            return outcome;
        }
        if let Some(resolved) = resolve::resolve_package(self, name) {
            if let Err(e) = resolved.unit.install(self) {
                self.log
                    .warn(&format!("unit {} failed for '{name}': {e:#}", resolved.id));
            }
            return Outcome::Unit(resolved.id);
        }
        self.dispatch_script(&[BUILTIN_INSTALL_DIR], &script)
            .unwrap_or_else(|| self.install_package_default(name))
    }

    /// Install each package of `names` in order.
    pub fn install_package_list<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Outcome> {
        names
            .iter()
            .map(|name| self.install_package(name.as_ref()))
            .collect()
    }

    /// Install package `name` from an `install_<name>` script, or with the
    /// raw install command when no script exists.
    pub fn install_package_by_script(&mut self, name: &str) -> Outcome {
        let script = format!("install_{name}");
        self.dispatch_script(&[CUSTOM_SCRIPTS_DIR, BUILTIN_INSTALL_DIR], &script)
            .unwrap_or_else(|| self.install_package_default(name))
    }

    fn install_package_default(&mut self, name: &str) -> Outcome {
        self.log.warn(&format!(
            "No installation script found for '{name}', using default command..."
        ));
        self.push_install_message(&[name], 0);
        let action = self.command.install(&[name]);
        self.command.push(action);
        Outcome::Default
    }

    /// Register repository `name` from an `add_repo_<name>` script, or with
    /// the raw repository command when no script exists.
    pub fn install_apt_repo(&mut self, name: &str) -> Outcome {
        self.context.ledger.mark_repository_installed(name);
        let script = format!("add_repo_{name}");
        let dirs = [CUSTOM_SCRIPTS_DIR, BUILTIN_REPO_DIR];
        if let Some(outcome) = self.dispatch_script(&dirs, &script) {
            return outcome;
        }
        self.log.warn(&format!(
            "No installation script found for repo '{name}', using default command..."
        ));
        self.command.push_message("Adding apt-repo %s ...", &[name]);
        let action = self.command.add_repo(name);
        self.command.push(action);
        Outcome::Default
    }

    /// Install every required repository not yet installed in this pass.
    pub fn install_required_repos(&mut self) -> Vec<Outcome> {
        self.context
            .ledger
            .pending_repositories()
            .iter()
            .map(|name| self.install_apt_repo(name))
            .collect()
    }

    /// Run script `name` from `scripts/` or `provision/scripts/`.
    pub fn run_script(&mut self, name: &str) -> Outcome {
        self.dispatch_script(&[CUSTOM_SCRIPTS_DIR, BUILTIN_SCRIPTS_DIR], name)
            .unwrap_or_else(|| {
                self.log
                    .warn(&ResolveError::NotFound(name.to_string()).to_string());
                Outcome::Missing
            })
    }

    /// Install `name` unless it has already been required.
    pub fn require_package(&mut self, name: &str) -> Outcome {
        if !self.context.ledger.dependencies.insert(name) {
            self.log.debug(&format!("'{name}' already required"));
            return Outcome::AlreadyRequired;
        }
        self.install_package(name)
    }

    /// Record repository `name` as required without emitting anything.
    ///
    /// Returns `false` if it was already recorded.
    pub fn require_apt_repo(&mut self, name: &str) -> bool {
        self.context.ledger.repositories.insert(name)
    }

    /// Append an `Installing: ...` message for `names`.
    ///
    /// Empty names are skipped; a positive `level` indents the message with
    /// an `==>` style arrow, two `=` per level.
    pub fn push_install_message(&mut self, names: &[&str], level: usize) {
        let joined = names
            .iter()
            .filter(|name| !name.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let pattern = if level > 0 {
            format!("{}> {INSTALL_MESSAGE}", "=".repeat(level * 2))
        } else {
            INSTALL_MESSAGE.to_string()
        };
        self.command.push_message(&pattern, &[&joined]);
    }

    /// Queue a copy of `config/copy/<source>` to `dest` on the guest.
    ///
    /// `dest` defaults to `/` plus the file name of `source`, and is always
    /// rooted at `/`.  The existence check runs on the guest every pass.
    pub fn queue_copy(&mut self, source: &str, dest: Option<&str>) {
        let dest = match dest {
            Some(dest) => format!("/{}", dest.trim_start_matches('/')),
            None => {
                let base = Path::new(source)
                    .file_name()
                    .map_or_else(|| source.to_string(), |n| n.to_string_lossy().into_owned());
                format!("/{base}")
            }
        };
        let guest_source = self.layout.guest_copy_source(source);
        self.command.push_message("Copying %s ...", &[&dest]);
        let command = &self.command;
        let action = command.make_if(
            command.check_file_existence(&guest_source),
            command.sudo(command.copy(&guest_source, &dest)),
            command.warning("File not exists"),
        );
        self.command.push_always(action);
    }

    /// Describe how package `name` would be installed, without emitting
    /// anything.
    #[must_use]
    pub fn explain_package(&self, name: &str) -> Outcome {
        let script = format!("install_{name}");
        if let Some(source) = resolve::resolve_script(self, &[CUSTOM_SCRIPTS_DIR], &script) {
            return Outcome::Script(source.to_string());
        }
        if let Some(resolved) = resolve::resolve_package(self, name) {
            return Outcome::Unit(resolved.id);
        }
        resolve::resolve_script(self, &[BUILTIN_INSTALL_DIR], &script)
            .map_or(Outcome::Default, |source| Outcome::Script(source.to_string()))
    }

    /// Render the action sequence as a bash script.
    #[must_use]
    pub fn render(&self) -> String {
        self.command.render()
    }

    fn dispatch_script(&mut self, dirs: &[&str], name: &str) -> Option<Outcome> {
        let source = resolve::resolve_script(self, dirs, name)?;
        match &source {
            ScriptSource::Callback { key, callback } => {
                self.log.debug(&format!("running callback {key}"));
                if let Err(e) = callback(self) {
                    self.log.warn(&format!("callback {key} failed: {e:#}"));
                }
            }
            ScriptSource::File(path) => {
                self.command.push_file(path);
            }
        }
        Some(Outcome::Script(source.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::command::Action;
    use crate::config::layout::BASE_PACKAGES_DIR;
    use crate::logging::{Level, MemoryLog};
    use crate::operations::MockFileSystemOps;
    use crate::resolve::Unit;

    #[derive(Debug)]
    struct Echo(&'static str);

    impl Unit for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn install(&self, p: &mut Provisioner) -> anyhow::Result<()> {
            p.command_mut().push_message("unit %s", &[self.0]);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Unit for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn install(&self, p: &mut Provisioner) -> anyhow::Result<()> {
            p.command_mut().push_message("half done", &[]);
            anyhow::bail!("network down")
        }
    }

    fn settings(yaml: &str) -> Settings {
        Settings::from_yaml(yaml).unwrap()
    }

    fn build(
        yaml: &str,
        registry: Registry,
        fs: MockFileSystemOps,
    ) -> (Provisioner, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        let p = Provisioner::new("web", settings(yaml), Arc::new(registry), log.clone())
            .with_layout(Layout::new("/p"))
            .with_fs_ops(Arc::new(fs));
        (p, log)
    }

    fn messages(p: &Provisioner) -> Vec<String> {
        p.command()
            .actions()
            .iter()
            .filter_map(|a| match a {
                Action::Message { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn context_comes_from_settings() {
        let (p, _) = build(
            "os: centos\nversion: 7\nplugins: [a]\nultilities_ip: 10.0.0.2\n",
            Registry::new(),
            MockFileSystemOps::new(),
        );
        let ctx = p.context();
        assert_eq!(ctx.machine_name, "web");
        assert_eq!(ctx.family, OsFamily::Rpm);
        assert_eq!(ctx.version, "7");
        assert_eq!(ctx.plugins, vec!["a"]);
        assert!(ctx.use_utilities);
    }

    #[test]
    fn unknown_package_falls_back_to_default_install() {
        let (mut p, log) = build("os: ubuntu\n", Registry::new(), MockFileSystemOps::new());
        assert_eq!(p.install_package("redis"), Outcome::Default);
        assert_eq!(messages(&p), vec!["Installing: redis ..."]);
        assert_eq!(p.command().len(), 2);
        assert!(p.command().actions()[1].mentions("apt-get install -y redis"));
        assert!(log.contains(
            Level::Warn,
            "No installation script found for 'redis', using default command..."
        ));
    }

    #[test]
    fn custom_script_takes_precedence_over_unit() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "git", |_| Ok(Box::new(Echo("git"))));
        registry.register_plugin_unit("a", "git", |_| Ok(Box::new(Echo("plugin git"))));
        let fs = MockFileSystemOps::new().with_file("/p/scripts/install_git.sh", "echo custom\n");
        let (mut p, _) = build("os: ubuntu\nplugins: [a]\n", registry, fs);
        assert_eq!(
            p.install_package("git"),
            Outcome::Script("script /p/scripts/install_git.sh".to_string())
        );
        assert_eq!(p.command().actions(), &[Action::command("echo custom\n")]);
    }

    #[test]
    fn custom_callback_takes_precedence_over_unit() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "git", |_| Ok(Box::new(Echo("git"))));
        registry.register_script(CUSTOM_SCRIPTS_DIR, "install_git", |p| {
            p.command_mut().push_message("custom git", &[]);
            Ok(())
        });
        let (mut p, _) = build("os: ubuntu\n", registry, MockFileSystemOps::new());
        assert_eq!(
            p.install_package("git"),
            Outcome::Script("callback scripts/install_git".to_string())
        );
        assert_eq!(messages(&p), vec!["custom git"]);
    }

    #[test]
    fn unit_takes_precedence_over_builtin_script() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "git", |_| Ok(Box::new(Echo("git"))));
        let fs = MockFileSystemOps::new()
            .with_file("/p/provision/install/install_git.sh", "echo builtin\n");
        let (mut p, _) = build("os: ubuntu\n", registry, fs);
        assert_eq!(
            p.install_package("git"),
            Outcome::Unit("SmartVagrant::Packages::Git".to_string())
        );
        assert_eq!(messages(&p), vec!["unit git"]);
    }

    #[test]
    fn custom_script_overrides_builtin_script() {
        let fs = MockFileSystemOps::new()
            .with_file("/p/scripts/install_git.sh", "echo custom\n")
            .with_file("/p/provision/install/install_git.sh", "echo builtin\n");
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), fs);
        assert_eq!(
            p.install_package("git"),
            Outcome::Script("script /p/scripts/install_git.sh".to_string())
        );
        assert_eq!(p.command().actions(), &[Action::command("echo custom\n")]);
    }

    #[test]
    fn failing_unit_is_logged_and_keeps_its_actions() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "x", |_| Ok(Box::new(Broken)));
        let (mut p, log) = build("os: ubuntu\n", registry, MockFileSystemOps::new());
        assert!(matches!(p.install_package("x"), Outcome::Unit(_)));
        assert_eq!(messages(&p), vec!["half done"]);
        assert!(log.contains(Level::Warn, "network down"));
    }

    #[test]
    fn callback_receives_the_provisioner() {
        let mut registry = Registry::new();
        registry.register_script(CUSTOM_SCRIPTS_DIR, "install_php", |p| {
            p.require_apt_repo("ondrej/php");
            p.install_required_repos();
            p.push_install_message(&["php", "", "php-fpm"], 1);
            Ok(())
        });
        let (mut p, _) = build("os: ubuntu\n", registry, MockFileSystemOps::new());
        assert_eq!(
            p.install_package("php"),
            Outcome::Script("callback scripts/install_php".to_string())
        );
        assert_eq!(
            messages(&p),
            vec!["Adding apt-repo ondrej/php ...", "==> Installing: php, php-fpm ..."]
        );
    }

    #[test]
    fn require_package_installs_once() {
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), MockFileSystemOps::new());
        assert_eq!(p.require_package("curl"), Outcome::Default);
        assert_eq!(p.require_package("curl"), Outcome::AlreadyRequired);
        let installs = p
            .command()
            .actions()
            .iter()
            .filter(|a| a.mentions("apt-get install -y curl"))
            .count();
        assert_eq!(installs, 1);
        assert_eq!(
            p.context().ledger.dependencies.iter().collect::<Vec<_>>(),
            vec!["curl"]
        );
    }

    #[test]
    fn declared_dependencies_count_as_required() {
        let (mut p, _) = build(
            "os: ubuntu\ndependencies: [curl]\n",
            Registry::new(),
            MockFileSystemOps::new(),
        );
        assert_eq!(p.require_package("curl"), Outcome::AlreadyRequired);
        assert!(p.command().is_empty());
    }

    #[test]
    fn require_apt_repo_records_only() {
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), MockFileSystemOps::new());
        assert!(p.require_apt_repo("r"));
        assert!(!p.require_apt_repo("r"));
        assert!(p.command().is_empty());
        assert_eq!(p.context().ledger.repositories.len(), 1);
    }

    #[test]
    fn required_repos_install_once() {
        let (mut p, _) = build(
            "os: ubuntu\nrepositories: [ondrej/php]\n",
            Registry::new(),
            MockFileSystemOps::new(),
        );
        assert_eq!(p.install_required_repos(), vec![Outcome::Default]);
        assert!(p.install_required_repos().is_empty());
        assert!(p.command().actions()[1].mentions("add-apt-repository -y ppa:ondrej/php"));
    }

    #[test]
    fn repo_script_is_preferred() {
        let fs = MockFileSystemOps::new()
            .with_file("/p/provision/apt-repo/add_repo_docker.sh", "curl get.docker.com\n");
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), fs);
        assert!(matches!(p.install_apt_repo("docker"), Outcome::Script(_)));
        assert_eq!(p.command().actions(), &[Action::command("curl get.docker.com\n")]);
    }

    #[test]
    fn run_script_miss_warns_without_actions() {
        let (mut p, log) = build("os: ubuntu\n", Registry::new(), MockFileSystemOps::new());
        assert_eq!(p.run_script("swap"), Outcome::Missing);
        assert!(p.command().is_empty());
        assert!(log.contains(Level::Warn, "No script found for 'swap'"));
    }

    #[test]
    fn run_script_ignores_install_dir() {
        let fs = MockFileSystemOps::new().with_file("/p/provision/install/swap.sh", "x\n");
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), fs);
        assert_eq!(p.run_script("swap"), Outcome::Missing);
    }

    #[test]
    fn queue_copy_defaults_to_root_basename() {
        let (mut p, _) = build("os: ubuntu\n", Registry::new(), MockFileSystemOps::new());
        p.queue_copy("foo.txt", None);
        p.queue_copy("foo.txt", Some("bar/baz.txt"));
        p.queue_copy("nested/dir/app.conf", None);
        let actions = p.command().actions();
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[0], Action::message("Copying /foo.txt ..."));
        let Action::Conditional { condition, then, otherwise } = &actions[1] else {
            panic!("expected a conditional");
        };
        assert!(condition.mentions("[ -f /smart-vagrant/config/copy/foo.txt ]"));
        assert_eq!(
            **then,
            Action::command("sudo cp -f /smart-vagrant/config/copy/foo.txt /foo.txt")
        );
        assert!(otherwise.as_ref().unwrap().mentions("File not exists"));
        assert!(actions[3].mentions("cp -f /smart-vagrant/config/copy/foo.txt /bar/baz.txt"));
        assert!(actions[5].mentions("/nested/dir/app.conf /app.conf"));
    }

    #[test]
    fn explain_does_not_emit() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "git", |_| Ok(Box::new(Echo("git"))));
        let fs = MockFileSystemOps::new().with_file("/p/provision/install/install_vim.sh", "");
        let (p, _) = build("os: ubuntu\n", registry, fs);
        assert_eq!(p.explain_package("git").to_string(), "unit SmartVagrant::Packages::Git");
        assert_eq!(
            p.explain_package("vim").to_string(),
            "script /p/provision/install/install_vim.sh"
        );
        assert_eq!(p.explain_package("zsh"), Outcome::Default);
        assert!(p.command().is_empty());
    }

    #[test]
    fn explain_prefers_custom_script_over_unit() {
        let mut registry = Registry::new();
        registry.register_unit(BASE_PACKAGES_DIR, "git", |_| Ok(Box::new(Echo("git"))));
        let fs = MockFileSystemOps::new().with_file("/p/scripts/install_git.sh", "");
        let (p, _) = build("os: ubuntu\n", registry, fs);
        assert_eq!(
            p.explain_package("git").to_string(),
            "script /p/scripts/install_git.sh"
        );
    }
}
