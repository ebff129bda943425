use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;

use smart_provision::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);

    let mut stdout = io::stdout().lock();
    match args.command {
        cli::Command::Render(opts) => commands::render::run(&args.global, &opts, &mut stdout),
        cli::Command::Explain(opts) => commands::explain::run(&args.global, &opts, &mut stdout),
        cli::Command::Version => {
            let version =
                option_env!("SMART_PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            writeln!(stdout, "smart-provision {version}")?;
            Ok(())
        }
    }
}
