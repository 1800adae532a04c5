//! Scan result persistence.
//!
//! Provides JSON-based storage for finished scan results.

mod json_store;

pub use json_store::{ScanRecord, ScanStore};
