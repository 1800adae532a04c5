//! Accumulator for fields discovered during a single parse pass.

use crate::types::{HostInfo, HostStatus, OsFingerprint, PortRecord, ScanResult};

/// Partially-populated scan data. Fields stay `None` until the parser meets
/// them; `into_result` applies the documented defaults.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub scanner_version: Option<String>,
    pub scan_timestamp: Option<String>,
    pub hostname: Option<String>,
    pub address: Option<String>,
    pub status: Option<HostStatus>,
    pub latency_seconds: Option<f64>,
    pub ports: Vec<PortRecord>,
    pub os_description: Option<String>,
    pub os_cpe: Option<String>,
}

impl Draft {
    pub fn into_result(self) -> ScanResult {
        let fingerprint_default = OsFingerprint::default();

        ScanResult {
            scanner_version: self.scanner_version.unwrap_or_default(),
            scan_timestamp: self.scan_timestamp.unwrap_or_default(),
            host: HostInfo {
                hostname: self.hostname.unwrap_or_default(),
                address: self.address.unwrap_or_default(),
                status: self.status.unwrap_or_default(),
                latency_seconds: self.latency_seconds.unwrap_or(0.0),
            },
            ports: self.ports,
            fingerprint: OsFingerprint {
                description: self
                    .os_description
                    .unwrap_or(fingerprint_default.description),
                cpe: self.os_cpe.unwrap_or(fingerprint_default.cpe),
            },
        }
    }
}
