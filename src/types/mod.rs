//! Core type definitions using newtype patterns for type safety.
//!
//! Validated newtypes keep invalid ports and option-like targets out of the
//! engine; the canonical result model lives in `result`.

mod port;
mod result;
mod scan_id;
mod target;

pub use port::{Port, PortError};
pub use result::{
    HostInfo, HostStatus, OsFingerprint, PortRecord, PortState, ScanResult, Transport, UNKNOWN_OS,
};
pub use scan_id::{ScanId, ScanIdError};
pub use target::{ScanTarget, TargetError};
