use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;
use crate::hardware::Category;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "hwsnap")]
#[command(about = "Print a JSON snapshot of the host's hardware")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags that take precedence over the configuration file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Configuration file (default: <config dir>/hwsnap/config.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Categories to probe, comma-separated
    #[arg(short = 'C', long, value_delimiter = ',', global = true)]
    pub categories: Option<Vec<Category>>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Read /proc, /sys and firmware tables below this directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Run the probes concurrently
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Let the probing layer emit warnings
    #[arg(long, global = true)]
    pub warnings: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Aggregate every enabled category into one document (default)
    Snapshot,
    /// Collect memory information
    Memory,
    /// Collect CPU information
    Cpu,
    /// Collect block device information
    Block,
    /// Collect NUMA topology
    Topology,
    /// Collect network interface information
    Network,
    /// Collect GPU information
    Gpu,
    /// Print the example configuration file
    PrintDefaultConfig,
}

impl Commands {
    /// The single category a per-category command probes.
    pub fn category(self) -> Option<Category> {
        match self {
            Commands::Memory => Some(Category::Memory),
            Commands::Cpu => Some(Category::Cpu),
            Commands::Block => Some(Category::Block),
            Commands::Topology => Some(Category::Topology),
            Commands::Network => Some(Category::Network),
            Commands::Gpu => Some(Category::Gpu),
            Commands::Snapshot | Commands::PrintDefaultConfig => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_snapshot() {
        let cli = Cli::try_parse_from(["hwsnap"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(cli.overrides.categories.is_none());
        assert!(!cli.overrides.parallel);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "hwsnap",
            "--categories",
            "memory,cpu,gpu",
            "--format",
            "yaml",
            "--root",
            "/srv/image",
            "--parallel",
        ])
        .unwrap();

        assert_eq!(
            cli.overrides.categories,
            Some(vec![Category::Memory, Category::Cpu, Category::Gpu])
        );
        assert_eq!(cli.overrides.format, Some(OutputFormat::Yaml));
        assert_eq!(cli.overrides.root, Some(PathBuf::from("/srv/image")));
        assert!(cli.overrides.parallel);
    }

    #[test]
    fn per_category_command() {
        let cli = Cli::try_parse_from(["hwsnap", "gpu", "--warnings"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Gpu));
        assert_eq!(cli.command.and_then(Commands::category), Some(Category::Gpu));
        assert!(cli.overrides.warnings);
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(Cli::try_parse_from(["hwsnap", "-C", "memory,floppy"]).is_err());
    }
}
