//! Parser for the scanner's human-readable report.
//!
//! Single forward pass over trimmed lines. Unrecognized lines are skipped:
//! banners and metadata vary with scanner version and verbosity.

use super::draft::Draft;
use crate::error::ParseFailure;
use crate::types::{HostStatus, Port, PortRecord, PortState, ScanResult, Transport};
use tracing::{debug, trace, warn};

const REPORT_MARKER: &str = " scan report for ";

/// Parse a text report into a draft scan result.
///
/// Fails with `NoHostFound` when the input is empty or has no host report
/// line. The OS fingerprint is never populated from text output.
pub fn parse_text(raw: &str) -> Result<ScanResult, ParseFailure> {
    let mut draft = Draft::default();
    let mut host_seen = false;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((version, timestamp)) = parse_banner(line) {
            debug!(version, ?timestamp, "scanner banner");
            draft.scanner_version = Some(version.to_string());
            draft.scan_timestamp = timestamp.map(str::to_string);
        } else if let Some(report) = parse_host_report(line) {
            if host_seen {
                warn!("ignoring additional host report: {}", line);
                break;
            }
            host_seen = true;
            draft.hostname = report.hostname.map(str::to_string);
            draft.address = Some(report.address.to_string());
            if report.down {
                draft.status = Some(HostStatus::Down);
            }
        } else if let Some(rest) = line.strip_prefix("Host is up") {
            draft.status = Some(HostStatus::Up);
            draft.latency_seconds = parse_latency(rest);
        } else if let Some(record) = parse_port_line(line) {
            draft.ports.push(record);
        } else {
            trace!("skipping line: {}", line);
        }
    }

    if !host_seen {
        return Err(ParseFailure::NoHostFound);
    }

    Ok(draft.into_result())
}

/// `Starting <tool> <version> ... at <timestamp>`
fn parse_banner(line: &str) -> Option<(&str, Option<&str>)> {
    let rest = line.strip_prefix("Starting ")?;
    let mut tokens = rest.split_whitespace();
    let _tool = tokens.next()?;
    let version = tokens.next()?;

    let timestamp = rest
        .rfind(" at ")
        .map(|i| rest[i + 4..].trim())
        .filter(|t| !t.is_empty());

    Some((version, timestamp))
}

struct HostReport<'a> {
    hostname: Option<&'a str>,
    address: &'a str,
    down: bool,
}

/// `<tool> scan report for <address>` or `... for <hostname> (<address>)`
fn parse_host_report(line: &str) -> Option<HostReport<'_>> {
    let idx = line.find(REPORT_MARKER)?;
    let tool = &line[..idx];
    if tool.is_empty() || tool.contains(char::is_whitespace) {
        return None;
    }

    let rest = &line[idx + REPORT_MARKER.len()..];
    let mut tokens = rest.split_whitespace();
    let first = tokens.next()?;
    let second = tokens.next();
    let down = rest.contains("[host down");

    match second {
        Some(address) if address.starts_with('(') => Some(HostReport {
            hostname: Some(first),
            address: strip_parens(address),
            down,
        }),
        _ => Some(HostReport {
            hostname: None,
            address: strip_parens(first),
            down,
        }),
    }
}

fn strip_parens(token: &str) -> &str {
    token.trim_start_matches('(').trim_end_matches(')')
}

/// Latency from the remainder of `Host is up (0.000061s latency).`
fn parse_latency(rest: &str) -> Option<f64> {
    let start = rest.find('(')?;
    let value = rest[start + 1..].split_whitespace().next()?;
    value.strip_suffix('s')?.parse().ok()
}

/// `<port>/<protocol> <state> <service>[ <version>]`
fn parse_port_line(line: &str) -> Option<PortRecord> {
    let (spec, rest) = split_token(line)?;
    let (number, protocol) = spec.split_once('/')?;
    let port: Port = number.parse().ok()?;
    let Some(transport) = Transport::from_token(protocol) else {
        debug!("skipping unsupported protocol '{}' for port {}", protocol, port);
        return None;
    };

    let (state, rest) = split_token(rest)?;
    let (service, version) = split_token(rest).unwrap_or(("", ""));

    let mut record = PortRecord::new(port, transport, PortState::from_token(state), service);
    if !version.is_empty() {
        record.version_info = Some(version.to_string());
    }
    Some(record)
}

/// Split off the first whitespace-delimited token, returning it and the
/// trimmed remainder.
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    match s.find(char::is_whitespace) {
        Some(i) => Some((&s[..i], s[i..].trim_start())),
        None => Some((s, "")),
    }
}
