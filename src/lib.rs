//! # scanvault - structured results from an external port scanner
//!
//! scanvault launches nmap against a single host, captures its output under
//! a time and size limit, parses either the human-readable text report or the
//! XML report into one canonical [`ScanResult`](types::ScanResult), and
//! normalizes it so both modes produce the same shape.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use scanvault::engine::ScanEngine;
//! use scanvault::runner::{OutputMode, RunnerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RunnerConfig::default().with_timeout(Duration::from_secs(60));
//!     let engine = ScanEngine::with_config(config);
//!
//!     let result = engine.scan("scanme.nmap.org", OutputMode::Xml).await.unwrap();
//!     for port in result.open_ports() {
//!         println!("{}/{} {}", port.port_number, port.transport, port.service_name);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated newtypes and the canonical result model
//! - [`runner`] - Scanner process invocation and the `ScanRunner` seam
//! - [`parser`] - Text and XML report parsers
//! - [`normalize`] - Result cleanup shared by both parsers
//! - [`engine`] - The validate, run, parse, normalize pipeline
//! - [`config`] - Settings and XDG paths
//! - [`storage`] - Scan result persistence
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod runner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use engine::ScanEngine;
pub use error::{CliError, ParseFailure, ScanFailure};
pub use runner::{OutputMode, RunnerConfig, ScanRunner};
pub use types::{HostStatus, Port, PortState, ScanId, ScanResult, ScanTarget, Transport};
