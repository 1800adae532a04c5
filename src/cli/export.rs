//! Export subcommand implementation.
//!
//! Handles the `scanvault export <scan-id>` command for exporting scan results.

use super::Context;
use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::{self, Report};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Export a stored scan.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Scan ID or prefix to export
    ///
    /// Can be a full UUID or the first few characters (short ID).
    #[arg(value_name = "SCAN_ID")]
    pub scan_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,
}

impl ExportCommand {
    /// Execute the export command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let record = ctx.store()?.find(&self.scan_id)?;
        let report = Report::from(&record);

        match &self.output_file {
            Some(path) => {
                let content = output::render_report(&report, self.format)?;
                fs::write(path, content).map_err(|e| {
                    CliError::Other(format!("failed to write {}: {}", path.display(), e))
                })?;

                if !ctx.quiet {
                    output::print_success(&format!(
                        "Exported scan {} to {}",
                        record.id.short(),
                        path.display()
                    ));
                }
            }
            None => output::print_report(&report, self.format)?,
        }

        Ok(())
    }
}
