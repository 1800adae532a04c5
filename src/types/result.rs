//! Canonical scan result model.
//!
//! Both output parsers produce these types and the normalizer finalizes them.
//! A `ScanResult` owns its port records; host and fingerprint data are plain
//! embedded values.

use super::Port;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fingerprint description used when the scanner reported no OS match.
pub const UNKNOWN_OS: &str = "Unknown";

/// Reachability of the scanned host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
    #[default]
    Unknown,
}

impl HostStatus {
    /// Map a scanner status token; anything unrecognized is `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Transport protocol of a port record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    /// Map a protocol token; other protocols (sctp, ip) are not port records.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Observed state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    #[default]
    Unknown,
}

impl PortState {
    /// Map a scanner state token. Compound states such as `open|filtered`
    /// are ambiguous and map to `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "filtered" => Self::Filtered,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The scanned host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostInfo {
    /// Reverse DNS or user-supplied name; empty when unknown.
    pub hostname: String,
    /// IP literal; never empty when `status` is `Up`.
    pub address: String,
    pub status: HostStatus,
    pub latency_seconds: f64,
}

/// One discovered port on the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port_number: Port,
    pub transport: Transport,
    pub state: PortState,
    pub service_name: String,
    /// Product and version banner. `None` means the scanner reported nothing,
    /// which is distinct from an empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<BTreeMap<String, String>>,
}

impl PortRecord {
    /// Create a port record with no version or extra information.
    pub fn new(
        port_number: Port,
        transport: Transport,
        state: PortState,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            port_number,
            transport,
            state,
            service_name: service_name.into(),
            version_info: None,
            extra_info: None,
        }
    }

    /// Set the version information.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version_info = Some(version.into());
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Best-effort operating system identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsFingerprint {
    pub description: String,
    pub cpe: String,
}

impl Default for OsFingerprint {
    fn default() -> Self {
        Self {
            description: UNKNOWN_OS.to_string(),
            cpe: String::new(),
        }
    }
}

/// The canonical result of one scan invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub scanner_version: String,
    /// ISO-8601 when the scanner supplied a machine-readable time, otherwise
    /// the text exactly as captured.
    pub scan_timestamp: String,
    pub host: HostInfo,
    /// Port records in scan order.
    pub ports: Vec<PortRecord>,
    pub fingerprint: OsFingerprint,
}

impl ScanResult {
    /// Iterate over the open ports.
    pub fn open_ports(&self) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(|p| p.is_open())
    }
}
