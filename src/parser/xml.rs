//! Parser for the scanner's structured XML output.
//!
//! Unlike the text report, XML has a contract: malformed documents and a
//! missing run version are errors. Optional data (hostnames, OS matches,
//! service details) still falls back to defaults.

use super::draft::Draft;
use crate::error::ParseFailure;
use crate::types::{HostStatus, Port, PortError, PortRecord, PortState, ScanResult, Transport};
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// Service attributes carried into `PortRecord::extra_info`.
const EXTRA_SERVICE_ATTRIBUTES: &[&str] = &[
    "extrainfo",
    "ostype",
    "devicetype",
    "hostname",
    "tunnel",
    "method",
    "conf",
];

/// The `<times>` attributes are in microseconds.
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Parse an XML scan document into a draft scan result.
pub fn parse_xml(raw: &str) -> Result<ScanResult, ParseFailure> {
    let cleaned = strip_doctype(raw);
    let doc = Document::parse(&cleaned).map_err(|e| ParseFailure::InvalidDocument(e.to_string()))?;

    let run = doc.root_element();
    if run.tag_name().name() != "nmaprun" {
        return Err(ParseFailure::InvalidDocument(format!(
            "unexpected root element <{}>",
            run.tag_name().name()
        )));
    }

    let mut draft = Draft::default();
    let version = run
        .attribute("version")
        .ok_or_else(|| ParseFailure::MissingField("version".to_string()))?;
    draft.scanner_version = Some(version.to_string());
    draft.scan_timestamp = Some(run_timestamp(run));

    match first(run, &["host"]) {
        Some(host) => read_host(host, &mut draft)?,
        None if reported_down(run) => {
            debug!("no host element; run statistics report the host down");
            draft.status = Some(HostStatus::Down);
        }
        None => return Err(ParseFailure::NoHostFound),
    }

    Ok(draft.into_result())
}

/// The scanner emits `<!DOCTYPE nmaprun>`, which the XML reader refuses.
fn strip_doctype(raw: &str) -> Cow<'_, str> {
    let Some(start) = raw.find("<!DOCTYPE") else {
        return Cow::Borrowed(raw);
    };
    match raw[start..].find('>') {
        Some(len) => Cow::Owned(format!("{}{}", &raw[..start], &raw[start + len + 1..])),
        None => Cow::Borrowed(raw),
    }
}

/// All elements reached by following `path` from `parent`.
///
/// A collection with zero, one or many entries comes back as a plain
/// sequence, so callers iterate every collection the same way.
fn entries<'a, 'input>(parent: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let mut level = vec![parent];
    for name in path {
        level = level
            .into_iter()
            .flat_map(|node| {
                node.children()
                    .filter(move |child| child.is_element() && child.tag_name().name() == *name)
            })
            .collect();
    }
    level
}

fn first<'a, 'input>(parent: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    entries(parent, path).into_iter().next()
}

fn run_timestamp(run: Node<'_, '_>) -> String {
    let started = run
        .attribute("start")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    if let Some(started) = started {
        return started.to_rfc3339();
    }
    if let Some(text) = run.attribute("startstr") {
        return text.to_string();
    }
    debug!("document carries no start time; using processing time");
    Utc::now().to_rfc3339()
}

fn reported_down(run: Node<'_, '_>) -> bool {
    first(run, &["runstats", "hosts"])
        .and_then(|hosts| hosts.attribute("down"))
        .and_then(|down| down.trim().parse::<u32>().ok())
        .is_some_and(|down| down > 0)
}

fn read_host(host: Node<'_, '_>, draft: &mut Draft) -> Result<(), ParseFailure> {
    draft.status = Some(
        first(host, &["status"])
            .and_then(|status| status.attribute("state"))
            .map(HostStatus::from_token)
            .unwrap_or_default(),
    );

    draft.address = entries(host, &["address"])
        .into_iter()
        .find(|address| address.attribute("addrtype") == Some("ipv4"))
        .and_then(|address| address.attribute("addr"))
        .map(str::to_string);

    draft.hostname = first(host, &["hostnames", "hostname"])
        .and_then(|hostname| hostname.attribute("name"))
        .map(str::to_string);

    draft.latency_seconds = first(host, &["times"])
        .and_then(|times| times.attribute("rttvar"))
        .and_then(|rttvar| rttvar.trim().parse::<f64>().ok())
        .map(|micros| micros / MICROS_PER_SECOND);

    for port in entries(host, &["ports", "port"]) {
        if let Some(record) = read_port(port)? {
            draft.ports.push(record);
        }
    }

    if let Some(os_match) = first(host, &["os", "osmatch"]) {
        draft.os_description = os_match.attribute("name").map(str::to_string);
        draft.os_cpe = first(os_match, &["osclass"])
            .and_then(|class| first(class, &["cpe"]))
            .and_then(|cpe| cpe.text())
            .map(str::to_string);
    }

    Ok(())
}

fn read_port(port: Node<'_, '_>) -> Result<Option<PortRecord>, ParseFailure> {
    let id = port
        .attribute("portid")
        .ok_or_else(|| ParseFailure::MissingField("portid".to_string()))?;
    let number: Port = id
        .parse()
        .map_err(|e: PortError| ParseFailure::InvalidDocument(e.to_string()))?;

    let protocol = port.attribute("protocol").unwrap_or("tcp");
    let Some(transport) = Transport::from_token(protocol) else {
        debug!("skipping unsupported protocol '{}' for port {}", protocol, number);
        return Ok(None);
    };

    let state_node = first(port, &["state"]);
    let state = state_node
        .and_then(|state| state.attribute("state"))
        .map(PortState::from_token)
        .unwrap_or_default();

    let service = first(port, &["service"]);
    let service_name = service
        .and_then(|service| service.attribute("name"))
        .unwrap_or("");

    let mut record = PortRecord::new(number, transport, state, service_name);
    record.version_info = service.and_then(version_info);
    record.extra_info = extra_info(service, state_node);
    Ok(Some(record))
}

/// `product` and `version` joined; `None` only when both are missing.
fn version_info(service: Node<'_, '_>) -> Option<String> {
    let product = service.attribute("product");
    let version = service.attribute("version");
    if product.is_none() && version.is_none() {
        return None;
    }

    let joined = [product, version]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined)
}

fn extra_info(
    service: Option<Node<'_, '_>>,
    state: Option<Node<'_, '_>>,
) -> Option<BTreeMap<String, String>> {
    let mut extra = BTreeMap::new();

    if let Some(service) = service {
        for &name in EXTRA_SERVICE_ATTRIBUTES {
            if let Some(value) = service.attribute(name) {
                extra.insert(name.to_string(), value.to_string());
            }
        }

        let cpes: Vec<&str> = entries(service, &["cpe"])
            .into_iter()
            .filter_map(|cpe| cpe.text())
            .collect();
        if !cpes.is_empty() {
            extra.insert("cpe".to_string(), cpes.join(" "));
        }
    }

    if let Some(reason) = state.and_then(|state| state.attribute("reason")) {
        extra.insert("reason".to_string(), reason.to_string());
    }

    (!extra.is_empty()).then_some(extra)
}
