//! Shared finishing rules for parser output.
//!
//! `normalize` is total and idempotent. It never reorders ports: scan order
//! is part of the result.

use crate::types::{HostStatus, ScanResult, UNKNOWN_OS};
use std::collections::BTreeMap;
use tracing::debug;

/// Finalize a draft result produced by either parser.
pub fn normalize(mut result: ScanResult) -> ScanResult {
    trim_in_place(&mut result.scanner_version);
    trim_in_place(&mut result.scan_timestamp);

    let host = &mut result.host;
    trim_in_place(&mut host.hostname);
    trim_in_place(&mut host.address);
    if !host.latency_seconds.is_finite() || host.latency_seconds < 0.0 {
        host.latency_seconds = 0.0;
    }
    if host.status == HostStatus::Up && host.address.is_empty() {
        debug!("host reported up without an address; status set to unknown");
        host.status = HostStatus::Unknown;
    }

    for port in &mut result.ports {
        trim_in_place(&mut port.service_name);
        port.version_info = port.version_info.take().and_then(non_empty);
        port.extra_info = port.extra_info.take().and_then(clean_extra);
    }

    let fingerprint = &mut result.fingerprint;
    trim_in_place(&mut fingerprint.description);
    trim_in_place(&mut fingerprint.cpe);
    if fingerprint.description.is_empty() {
        fingerprint.description = UNKNOWN_OS.to_string();
    }

    result
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn non_empty(mut value: String) -> Option<String> {
    trim_in_place(&mut value);
    (!value.is_empty()).then_some(value)
}

fn clean_extra(extra: BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    let cleaned: BTreeMap<String, String> = extra
        .into_iter()
        .filter_map(|(key, value)| Some((non_empty(key)?, non_empty(value)?)))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}
