//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.

mod csv_format;
mod json_format;
mod plain;

pub use plain::{print_error, print_info, print_scan_header, print_success, print_warning};

use crate::cli::OutputFormat;
use crate::storage::ScanRecord;
use crate::types::{ScanId, ScanResult};
use serde::Serialize;
use std::io::{self, Write};

/// A scan result as presented to the user, saved or not.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a ScanId>,
    pub target: &'a str,
    #[serde(flatten)]
    pub result: &'a ScanResult,
}

impl<'a> Report<'a> {
    /// Present a result that was not persisted.
    pub fn unsaved(target: &'a str, result: &'a ScanResult) -> Self {
        Self {
            id: None,
            target,
            result,
        }
    }
}

impl<'a> From<&'a ScanRecord> for Report<'a> {
    fn from(record: &'a ScanRecord) -> Self {
        Self {
            id: Some(&record.id),
            target: &record.target,
            result: &record.result,
        }
    }
}

/// Write `report` to `out` in the given format.
pub fn write_report<W: Write>(out: &mut W, report: &Report<'_>, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_plain(out, report),
        OutputFormat::Json => json_format::write_json(out, report),
        OutputFormat::Csv => csv_format::write_csv(out, report),
    }
}

/// Format and print scan results according to the specified format.
pub fn print_report(report: &Report<'_>, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)?;
    out.flush()
}

/// Render `report` to a string with terminal styling removed.
pub fn render_report(report: &Report<'_>, format: OutputFormat) -> io::Result<String> {
    let mut buf = Vec::new();
    write_report(&mut buf, report, format)?;
    let text = String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(console::strip_ansi_codes(&text).into_owned())
}
