//! Scan subcommand implementation.
//!
//! Handles the `scanvault scan <target>` command.

use super::Context;
use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::engine::ScanEngine;
use crate::error::CliResult;
use crate::output::{self, Report};
use crate::runner::OutputMode;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Scan a single host with the external scanner.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP address or hostname)
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   scanme.nmap.org    Hostname
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Scanner report format to request and parse
    #[arg(short, long, value_enum)]
    pub mode: Option<OutputMode>,

    /// Scanner wall-clock limit in seconds
    #[arg(short = 't', long, env = "SCANVAULT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum scanner output in bytes
    #[arg(long = "max-output", value_name = "BYTES")]
    pub max_output: Option<usize>,

    /// Scanner executable name or path
    #[arg(long, env = "SCANVAULT_SCANNER", value_name = "PATH")]
    pub scanner_path: Option<PathBuf>,

    /// Request OS detection (XML mode only, usually needs root)
    #[arg(short = 'O', long)]
    pub os_detection: bool,

    /// Don't save scan results
    #[arg(long)]
    pub no_save: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let settings = self.apply(&ctx.settings);
        let mode = self.mode.unwrap_or(settings.default_mode);
        let interactive = !ctx.quiet && self.output == OutputFormat::Plain;

        if settings.os_detection {
            if mode == OutputMode::Text {
                output::print_warning("OS detection is only requested in xml mode.");
            } else if !is_root() {
                output::print_warning("OS detection requires root/sudo privileges.");
                output::print_warning("The scanner may refuse to run or skip OS detection.");
            }
        }

        if interactive {
            output::print_scan_header(
                &self.target,
                &mode.to_string(),
                &settings.scanner_path.display().to_string(),
            );
        }

        let config = settings.runner_config();
        debug!(?config, %mode, "starting scan");
        let engine = ScanEngine::with_config(config);

        let spinner = interactive.then(|| spinner(&self.target));
        let outcome = engine.scan(&self.target, mode).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let result = outcome?;

        if settings.auto_save && !self.no_save {
            let record = ctx.store()?.save(&self.target, &result)?;
            output::print_report(&Report::from(&record), self.output)?;

            if interactive {
                output::print_info(&format!("Scan saved as {}", record.id.short()));
            }
        } else {
            output::print_report(&Report::unsaved(&self.target, &result), self.output)?;
        }

        Ok(())
    }

    /// Settings with this invocation's overrides applied.
    fn apply(&self, base: &AppSettings) -> AppSettings {
        let mut settings = base.clone();
        if let Some(path) = &self.scanner_path {
            settings.scanner_path = path.clone();
        }
        if let Some(secs) = self.timeout {
            settings.timeout_secs = secs;
        }
        if let Some(bytes) = self.max_output {
            settings.max_output_bytes = bytes;
        }
        if self.os_detection {
            settings.os_detection = true;
        }
        settings
    }
}

fn spinner(target: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Scanning {}", target));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
