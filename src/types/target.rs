//! Scan target validation.
//!
//! The target is handed to the scanner as a command-line argument, so it is
//! checked before any process is launched. Beyond that it is opaque: no DNS
//! resolution or CIDR expansion happens here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A hostname or IP literal to scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanTarget(String);

impl ScanTarget {
    /// Validate and wrap a caller-supplied target.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(TargetError::Empty);
        }
        // A leading dash would be read by the scanner as an option.
        if s.starts_with('-') {
            return Err(TargetError::LooksLikeOption(s.to_string()));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TargetError::InvalidCharacters(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    /// The target exactly as it is passed to the scanner.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the target is an IP literal rather than a hostname.
    pub fn is_ip_literal(&self) -> bool {
        self.0.parse::<IpAddr>().is_ok()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScanTarget {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScanTarget> for String {
    fn from(target: ScanTarget) -> Self {
        target.0
    }
}

impl AsRef<std::ffi::OsStr> for ScanTarget {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

/// Error type for target validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target must not be empty")]
    Empty,
    #[error("target '{0}' starts with '-'")]
    LooksLikeOption(String),
    #[error("target '{0}' contains whitespace or control characters")]
    InvalidCharacters(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_literal() {
        let target = ScanTarget::parse("10.0.0.5").unwrap();
        assert!(target.is_ip_literal());
        assert_eq!(target.as_str(), "10.0.0.5");
    }

    #[test]
    fn test_parse_hostname_trims() {
        let target = ScanTarget::parse("  host.local \n").unwrap();
        assert!(!target.is_ip_literal());
        assert_eq!(target.to_string(), "host.local");
    }

    #[test]
    fn test_reject_empty() {
        assert_eq!(ScanTarget::parse("   "), Err(TargetError::Empty));
    }

    #[test]
    fn test_reject_option_injection() {
        assert!(matches!(
            ScanTarget::parse("-oN/tmp/out"),
            Err(TargetError::LooksLikeOption(_))
        ));
        assert!(matches!(
            ScanTarget::parse("host.local -p1-65535"),
            Err(TargetError::InvalidCharacters(_))
        ));
    }
}
