//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `scanvault scan <target>` - Scan a target
//! - `scanvault history` - View scan history
//! - `scanvault export <scan-id>` - Export a stored scan

mod export;
mod history;
mod scan;

pub use export::ExportCommand;
pub use history::HistoryCommand;
pub use scan::ScanCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::storage::ScanStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// scanvault - run a port scanner and keep structured results.
///
/// Launches nmap against a single host, parses its text or XML report into a
/// normalized record, and stores each scan for later review and export.
#[derive(Parser, Debug)]
#[command(name = "scanvault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a host with nmap and keep structured results", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target with the external scanner
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View scan history
    #[command(alias = "h")]
    History(HistoryCommand),

    /// Export a stored scan
    #[command(alias = "e")]
    Export(ExportCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format, one row per port
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Everything a command handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: Paths,
    pub settings: AppSettings,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Resolve directories and load settings for this invocation.
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let paths = Paths::discover()?;
        let settings = match &cli.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load(&paths)?,
        };
        debug!(?settings, "settings loaded");

        Ok(Self {
            paths,
            settings,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Open the scan store in the data directory.
    pub fn store(&self) -> CliResult<ScanStore> {
        Ok(ScanStore::new(&self.paths)?)
    }
}

/// Dispatch the parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    let ctx = Context::load(&cli)?;

    match cli.command {
        Commands::Scan(cmd) => cmd.execute(&ctx).await,
        Commands::History(cmd) => cmd.execute(&ctx),
        Commands::Export(cmd) => cmd.execute(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_defaults() {
        let cli = Cli::try_parse_from(["scanvault", "scan", "10.0.0.5"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Scan(cmd) => {
                assert_eq!(cmd.target, "10.0.0.5");
                assert_eq!(cmd.output, OutputFormat::Plain);
                assert!(cmd.mode.is_none());
                assert!(!cmd.no_save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scanvault", "history", "-n", "3", "-q"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::History(cmd) => assert_eq!(cmd.count, 3),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["scanvault", "-v", "-q", "history"]).is_err());
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::try_parse_from(["scanvault", "e", "abcd1234", "--format", "csv"]).unwrap();
        match cli.command {
            Commands::Export(cmd) => {
                assert_eq!(cmd.scan_id, "abcd1234");
                assert_eq!(cmd.format, OutputFormat::Csv);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
