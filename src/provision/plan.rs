//! Full provisioning pass over a machine's settings.
use super::{Outcome, Provisioner};

/// Counts of how each request in a pass was served.
///
/// # Examples
///
/// ```
/// use smart_provision::provision::Summary;
///
/// let summary = Summary { units: 2, scripts: 1, defaults: 3, ..Summary::default() };
/// assert_eq!(summary.to_string(), "2 units, 1 scripts, 3 defaults");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Requests served by a structured unit.
    pub units: u32,
    /// Requests served by a script callback or `.sh` file.
    pub scripts: u32,
    /// Requests served by the raw package-manager command.
    pub defaults: u32,
    /// Requests for packages that were already required.
    pub already_required: u32,
    /// Scripts that could not be found.
    pub missing: u32,
    /// Queued file copies.
    pub copies: u32,
}

impl Summary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Unit(_) => self.units += 1,
            Outcome::Script(_) => self.scripts += 1,
            Outcome::Default => self.defaults += 1,
            Outcome::AlreadyRequired => self.already_required += 1,
            Outcome::Missing => self.missing += 1,
        }
    }

    fn record_all(&mut self, outcomes: &[Outcome]) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} units, {} scripts, {} defaults",
            self.units, self.scripts, self.defaults
        )?;
        if self.already_required > 0 {
            write!(f, ", {} already required", self.already_required)?;
        }
        if self.missing > 0 {
            write!(f, ", {} missing", self.missing)?;
        }
        if self.copies > 0 {
            write!(f, ", {} copies", self.copies)?;
        }
        Ok(())
    }
}

/// Compose the whole action sequence for the provisioner's machine.
///
/// Order: required repositories, declared dependencies, packages, scripts,
/// then file copies, framed by a banner and a closing message.  Each
/// package name is installed at most once: dependencies come from the
/// deduplicated ledger and packages go through
/// [`Provisioner::require_package`].
pub fn provision(provisioner: &mut Provisioner) -> Summary {
    let ctx = provisioner.context();
    let machine = ctx.machine_name.clone();
    let settings = ctx.settings.clone();
    let banner = format!("{} {}", ctx.os, ctx.version);
    let dependencies: Vec<String> = ctx.ledger.dependencies.iter().map(String::from).collect();

    provisioner
        .log()
        .stage(&format!("Composing provisioning sequence for {machine}"));
    provisioner
        .command_mut()
        .push_message("Provisioning %s (%s) ...", &[&machine, banner.trim()]);

    let mut summary = Summary::default();
    summary.record_all(&provisioner.install_required_repos());
    summary.record_all(&provisioner.install_package_list(&dependencies));
    for package in &settings.packages {
        let outcome = provisioner.require_package(package);
        summary.record(&outcome);
    }
    for script in &settings.scripts {
        let outcome = provisioner.run_script(script);
        summary.record(&outcome);
    }
    for entry in &settings.copy {
        provisioner.queue_copy(entry.source(), entry.dest());
        summary.copies += 1;
    }

    provisioner
        .command_mut()
        .push_message("Provisioning %s done", &[&machine]);
    provisioner.log().info(&format!("{machine}: {summary}"));
    summary
}
