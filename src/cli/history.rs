//! History subcommand implementation.

use super::Context;
use crate::error::CliResult;
use crate::output;
use crate::storage::ScanRecord;
use clap::Parser;
use console::style;

/// View and manage scan history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Clear all scan history
    #[arg(long)]
    pub clear: bool,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let store = ctx.store()?;

        if self.clear {
            let removed = store.clear()?;
            if !ctx.quiet {
                output::print_success(&format!("Removed {} stored scan(s)", removed));
            }
            return Ok(());
        }

        let records = store.list_recent(self.count)?;
        if records.is_empty() {
            if !ctx.quiet {
                output::print_info("No scans recorded yet.");
            }
            return Ok(());
        }

        for record in &records {
            println!("{}", history_line(record));
        }

        Ok(())
    }
}

fn history_line(record: &ScanRecord) -> String {
    format!(
        "{}  {}  {}",
        style(record.id.short()).cyan(),
        style(record.saved_at.format("%Y-%m-%d %H:%M:%S")).dim(),
        record.summary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScanResult;

    #[test]
    fn test_history_line() {
        let record = ScanRecord::new("10.0.0.5", ScanResult::default());
        let line = console::strip_ansi_codes(&history_line(&record)).into_owned();

        assert!(line.starts_with(&record.id.short()));
        assert!(line.ends_with("10.0.0.5 (no address) - unknown, 0 open of 0 ports"));
    }
}
