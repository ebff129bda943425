//! OS-family command builders and the ordered action sequence.
//!
//! Everything that knows about package-manager syntax lives here.  The
//! provisioner and the resolver only ever call the [`CommandBuilder`]
//! capability set, so they never branch on the guest OS.
pub mod apt;
pub mod shell;
pub mod yum;

use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::platform::OsFamily;

/// One emitted step of the provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Literal shell text, possibly spanning several lines.
    Command {
        /// Shell text, emitted verbatim.
        line: String,
    },
    /// `if <condition>; then <then>; [else <otherwise>;] fi`.
    Conditional {
        /// Test whose exit status selects the branch.
        condition: Box<Action>,
        /// Branch taken when the condition succeeds.
        then: Box<Action>,
        /// Branch taken otherwise, if any.
        otherwise: Option<Box<Action>>,
    },
    /// Human-readable progress annotation.
    Message {
        /// Annotation text.
        text: String,
    },
}

impl Action {
    /// A literal shell command.
    #[must_use]
    pub fn command(line: impl Into<String>) -> Self {
        Self::Command { line: line.into() }
    }

    /// A progress annotation.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    /// A conditional block.
    #[must_use]
    pub fn conditional(condition: Self, then: Self, otherwise: Option<Self>) -> Self {
        Self::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// Returns `true` for progress annotations.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self, Self::Message { .. })
    }

    /// Returns `true` for conditional blocks.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::Conditional { .. })
    }

    /// Returns `true` if `needle` occurs anywhere in the action's text,
    /// including nested branches.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            Self::Command { line } => line.contains(needle),
            Self::Message { text } => text.contains(needle),
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => {
                condition.mentions(needle)
                    || then.mentions(needle)
                    || otherwise.as_ref().is_some_and(|o| o.mentions(needle))
            }
        }
    }

    /// Render the action as bash.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    /// Only the generated `if`/`else`/`fi` scaffolding is indented; command
    /// text is emitted verbatim so heredocs and continuations survive.
    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Self::Command { line } => {
                out.push_str(line);
                if !line.ends_with('\n') {
                    out.push('\n');
                }
            }
            Self::Message { text } => {
                let _ = writeln!(out, "{pad}echo {}", shell::quote(text));
            }
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let test = condition.render();
                let _ = writeln!(out, "{pad}if {}; then", test.trim_end());
                then.render_into(out, depth + 1);
                if let Some(otherwise) = otherwise {
                    let _ = writeln!(out, "{pad}else");
                    otherwise.render_into(out, depth + 1);
                }
                let _ = writeln!(out, "{pad}fi");
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render().trim_end())
    }
}

/// Package-manager specific syntax for one OS family.
///
/// Only [`install`](Self::install), [`add_repo`](Self::add_repo) and
/// [`update`](Self::update) differ between families; the remaining
/// primitives are plain POSIX shell and shared through default methods.
pub trait CommandBuilder: Send + Sync + fmt::Debug {
    /// Family this builder targets.
    fn family(&self) -> OsFamily;

    /// Batch-install `names`.  Callers skip empty lists.
    fn install(&self, names: &[&str]) -> Action;

    /// Register the repository `name` and refresh the package index.
    fn add_repo(&self, name: &str) -> Action;

    /// Refresh the package index.
    fn update(&self) -> Action;

    /// Test that a regular file exists at `path` on the guest.
    fn check_file_existence(&self, path: &str) -> Action {
        Action::command(format!("[ -f {} ]", shell::quote(path)))
    }

    /// Run `action` with root privileges.
    fn sudo(&self, action: Action) -> Action {
        match action {
            Action::Command { line } if !line.contains('\n') => {
                Action::command(format!("sudo {line}"))
            }
            other => Action::command(format!(
                "sudo bash -c {}",
                shell::quote(other.render().trim_end())
            )),
        }
    }

    /// Copy `src` to `dst` on the guest.
    fn copy(&self, src: &str, dst: &str) -> Action {
        Action::command(format!("cp -f {} {}", shell::quote(src), shell::quote(dst)))
    }

    /// Print a warning from the guest.
    fn warning(&self, text: &str) -> Action {
        Action::command(format!(
            "echo {} >&2",
            shell::quote(&format!("[Warning] {text}"))
        ))
    }

    /// Build a conditional action.
    fn make_if(&self, condition: Action, then: Action, otherwise: Action) -> Action {
        Action::conditional(condition, then, Some(otherwise))
    }
}

/// Select the builder for `family`.
#[must_use]
pub fn builder_for(family: OsFamily) -> Box<dyn CommandBuilder> {
    match family {
        OsFamily::Debian => Box::new(apt::AptCommand),
        OsFamily::Rpm => Box::new(yum::YumCommand),
    }
}

/// Substitute each `%s` in `pattern` with the next element of `args`.
///
/// Surplus placeholders are left as-is; surplus arguments are ignored.
#[must_use]
pub fn format_pattern(pattern: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut args = args.iter();
    let mut rest = pattern;
    while let Some(pos) = rest.find("%s") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("%s"),
        }
        rest = tail.get(2..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}

/// The ordered, append-only action sequence of one machine together with
/// the builder for its OS family.
pub struct Command {
    builder: Box<dyn CommandBuilder>,
    actions: Vec<Action>,
    fs_ops: Arc<dyn FileSystemOps>,
    log: Arc<dyn Log>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("builder", &self.builder)
            .field("actions", &self.actions.len())
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl Command {
    /// Create an empty sequence for `family`.
    #[must_use]
    pub fn new(family: OsFamily, fs_ops: Arc<dyn FileSystemOps>, log: Arc<dyn Log>) -> Self {
        Self::with_builder(builder_for(family), fs_ops, log)
    }

    /// Create an empty sequence using a caller-supplied builder.
    #[must_use]
    pub fn with_builder(
        builder: Box<dyn CommandBuilder>,
        fs_ops: Arc<dyn FileSystemOps>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            builder,
            actions: Vec::new(),
            fs_ops,
            log,
        }
    }

    /// Replace the filesystem used by [`push_file`](Self::push_file).
    pub(crate) fn set_fs_ops(&mut self, fs_ops: Arc<dyn FileSystemOps>) {
        self.fs_ops = fs_ops;
    }

    /// Family of the active builder.
    #[must_use]
    pub fn family(&self) -> OsFamily {
        self.builder.family()
    }

    /// The active builder.
    #[must_use]
    pub fn builder(&self) -> &dyn CommandBuilder {
        self.builder.as_ref()
    }

    /// See [`CommandBuilder::install`].
    #[must_use]
    pub fn install(&self, names: &[&str]) -> Action {
        self.builder.install(names)
    }

    /// See [`CommandBuilder::add_repo`].
    #[must_use]
    pub fn add_repo(&self, name: &str) -> Action {
        self.builder.add_repo(name)
    }

    /// See [`CommandBuilder::update`].
    #[must_use]
    pub fn update(&self) -> Action {
        self.builder.update()
    }

    /// See [`CommandBuilder::check_file_existence`].
    #[must_use]
    pub fn check_file_existence(&self, path: &str) -> Action {
        self.builder.check_file_existence(path)
    }

    /// See [`CommandBuilder::sudo`].
    #[must_use]
    pub fn sudo(&self, action: Action) -> Action {
        self.builder.sudo(action)
    }

    /// See [`CommandBuilder::copy`].
    #[must_use]
    pub fn copy(&self, src: &str, dst: &str) -> Action {
        self.builder.copy(src, dst)
    }

    /// See [`CommandBuilder::warning`].
    #[must_use]
    pub fn warning(&self, text: &str) -> Action {
        self.builder.warning(text)
    }

    /// See [`CommandBuilder::make_if`].
    #[must_use]
    pub fn make_if(&self, condition: Action, then: Action, otherwise: Action) -> Action {
        self.builder.make_if(condition, then, otherwise)
    }

    /// Append `action`, guarded so it does not re-run once it has succeeded
    /// on the guest.  Messages are never guarded.
    pub fn push(&mut self, action: Action) {
        if action.is_message() {
            self.actions.push(action);
        } else {
            self.actions.push(shell::run_once(action));
        }
    }

    /// Append `action` as-is; it runs on every provisioning pass.
    pub fn push_always(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Append the contents of the script at `path` verbatim.
    ///
    /// A missing or unreadable file is logged and nothing is appended.
    /// Returns whether the file was appended.
    pub fn push_file(&mut self, path: &Path) -> bool {
        match self.fs_ops.read_to_string(path) {
            Ok(body) => {
                self.log
                    .debug(&format!("including script {}", path.display()));
                self.actions.push(Action::command(body));
                true
            }
            Err(e) => {
                self.log
                    .warn(&format!("cannot include script {}: {e}", path.display()));
                false
            }
        }
    }

    /// Append a progress annotation; `%s` in `pattern` is replaced by `args`.
    pub fn push_message(&mut self, pattern: &str, args: &[&str]) {
        self.actions
            .push(Action::message(format_pattern(pattern, args)));
    }

    /// Every action appended so far, in order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of appended actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Consume the sequence, returning its actions.
    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Render the whole sequence as a bash script.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("#!/usr/bin/env bash\nset -e\n");
        for action in &self.actions {
            out.push('\n');
            out.push_str(&action.render());
        }
        out
    }

    /// Serialize the sequence as JSON for an external executor.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.actions)
    }
}
