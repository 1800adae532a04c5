//! Configuration management for scanvault.
//!
//! Provides XDG-compliant configuration storage and the settings that
//! produce the scanner's `RunnerConfig`.

mod settings;

pub use settings::{AppSettings, Paths};
