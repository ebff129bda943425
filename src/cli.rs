//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "smart-provision",
    about = "Compose provisioning scripts for virtual machines",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the project root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the provisioning sequence of a machine
    Render(RenderOpts),
    /// Show which handler would install a package
    Explain(ExplainOpts),
    /// Print version information
    Version,
}

/// Output format of `render`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// A bash script
    #[default]
    Script,
    /// The action list as JSON
    Json,
}

/// Options for the `render` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RenderOpts {
    /// Machine name (reads config/<machine>.yaml)
    pub machine: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Script)]
    pub format: Format,
}

/// Options for the `explain` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ExplainOpts {
    /// Machine name (reads config/<machine>.yaml)
    pub machine: String,

    /// Package names to explain
    #[arg(required = true)]
    pub packages: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_render_defaults_to_script() {
        let cli = Cli::parse_from(["smart-provision", "render", "web"]);
        assert!(
            matches!(&cli.command, Command::Render(_)),
            "Expected Render command"
        );
        if let Command::Render(opts) = cli.command {
            assert_eq!(opts.machine, "web");
            assert_eq!(opts.format, Format::Script);
        }
    }

    #[test]
    fn parse_render_json() {
        let cli = Cli::parse_from(["smart-provision", "render", "web", "--format", "json"]);
        if let Command::Render(opts) = cli.command {
            assert_eq!(opts.format, Format::Json);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_explain_packages() {
        let cli = Cli::parse_from(["smart-provision", "explain", "web", "git", "nodejs"]);
        if let Command::Explain(opts) = cli.command {
            assert_eq!(opts.packages, vec!["git", "nodejs"]);
        } else {
            panic!("Expected Explain command");
        }
    }

    #[test]
    fn explain_requires_a_package() {
        assert!(Cli::try_parse_from(["smart-provision", "explain", "web"]).is_err());
    }

    #[test]
    fn parse_root_override_and_verbose() {
        let cli = Cli::parse_from(["smart-provision", "-v", "--root", "/srv/vms", "render", "db"]);
        assert!(cli.verbose);
        assert_eq!(cli.global.root, Some(PathBuf::from("/srv/vms")));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["smart-provision", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }
}
