//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use super::Report;
use crate::types::{HostStatus, PortState, UNKNOWN_OS};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write results in human-readable plain text format.
pub fn write_plain<W: Write>(out: &mut W, report: &Report<'_>) -> io::Result<()> {
    let result = report.result;
    let host = &result.host;

    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("scanvault").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    // Host info
    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    if !host.hostname.is_empty() {
        writeln!(out, "  {} {}", style("Hostname:").bold(), host.hostname)?;
    }
    writeln!(
        out,
        "  {} {}",
        style("Address:").bold(),
        if host.address.is_empty() {
            "-"
        } else {
            host.address.as_str()
        }
    )?;
    let status_style = match host.status {
        HostStatus::Up => Style::new().green().bold(),
        HostStatus::Down => Style::new().red(),
        HostStatus::Unknown => Style::new().yellow(),
    };
    writeln!(
        out,
        "  {} {} ({:.4}s latency)",
        style("Status:").bold(),
        status_style.apply_to(host.status),
        host.latency_seconds
    )?;
    if let Some(id) = report.id {
        writeln!(out, "  {} {}", style("Scan ID:").bold(), style(id.short()).dim())?;
    }
    writeln!(
        out,
        "  {} nmap {} at {}",
        style("Scanner:").bold(),
        result.scanner_version,
        result.scan_timestamp
    )?;
    writeln!(out)?;

    // Port table
    if result.ports.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<10}  {:<8}  {:<15}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("VERSION").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for port in &result.ports {
            let state_style = match port.state {
                PortState::Open => Style::new().green().bold(),
                PortState::Closed => Style::new().red(),
                PortState::Filtered => Style::new().yellow(),
                PortState::Unknown => Style::new().dim(),
            };

            writeln!(
                out,
                "  {:<10}  {:<8}  {:<15}  {}",
                format!("{}/{}", port.port_number, port.transport),
                state_style.apply_to(port.state.to_string()),
                port.service_name,
                style(port.version_info.as_deref().unwrap_or("")).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {} open of {} reported",
            style(result.open_ports().count()).green().bold(),
            result.ports.len()
        )?;
    }

    if result.fingerprint.description != UNKNOWN_OS {
        writeln!(out)?;
        writeln!(
            out,
            "  {} {}",
            style("OS:").bold(),
            result.fingerprint.description
        )?;
        if !result.fingerprint.cpe.is_empty() {
            writeln!(out, "  {} {}", style("CPE:").bold(), result.fingerprint.cpe)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, mode: &str, scanner: &str) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("scanvault").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Scanner: {}", style("•").dim(), style(scanner).yellow());
    eprintln!("{} Output mode: {}", style("•").dim(), style(mode).yellow());
    eprintln!("{} Target: {}", style("•").dim(), style(target).white().bold());
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
