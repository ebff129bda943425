//! `explain`: report which handler serves each package.
use std::io::Write;

use anyhow::Result;

use crate::cli::{ExplainOpts, GlobalOpts};
use crate::resolve;

/// Print, for each package, the handler that would install it.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or `out` cannot be
/// written.
pub fn run(global: &GlobalOpts, opts: &ExplainOpts, out: &mut impl Write) -> Result<()> {
    let provisioner = super::setup(global, &opts.machine)?;
    let dirs = resolve::package_search_dirs(&provisioner.context().plugins);
    provisioner
        .log()
        .debug(&format!("package search order: {}", dirs.join(", ")));

    for name in &opts.packages {
        writeln!(out, "{name}: {}", provisioner.explain_package(name))?;
    }
    Ok(())
}
