//! Scanner invocation.
//!
//! `ProcessRunner` launches the external scanner with a fixed argument set for
//! the requested output mode. Its policy (executable, timeout, output cap) is
//! a `RunnerConfig` value handed over at construction, so independent runners
//! can coexist in one process.

mod process;

pub use process::execute;

use crate::error::ScanFailure;
use crate::types::ScanTarget;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::info;

/// Default wall-clock limit for one scanner run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default cap on captured stdout (10 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Which output format the scanner is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable text report.
    Text,
    /// Structured XML written to stdout.
    #[default]
    Xml,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

/// Invocation policy for the scanner process.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Scanner executable, looked up on `PATH` when not absolute.
    pub scanner_path: PathBuf,
    /// Wall-clock limit after which the process is killed.
    pub timeout: Duration,
    /// Maximum bytes of stdout accepted before the run is abandoned.
    pub max_output_bytes: usize,
    /// Ask the scanner to probe service versions.
    pub service_detection: bool,
    /// Ask the scanner for OS detection (XML mode only, needs root).
    pub os_detection: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scanner_path: PathBuf::from("nmap"),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            service_detection: true,
            os_detection: false,
        }
    }
}

impl RunnerConfig {
    /// Set the scanner executable.
    pub fn with_scanner_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scanner_path = path.into();
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stdout cap.
    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Enable OS detection.
    pub fn with_os_detection(mut self) -> Self {
        self.os_detection = true;
        self
    }

    /// Scanner arguments for `mode`, excluding the target.
    pub fn arguments(&self, mode: OutputMode) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.service_detection {
            args.push("-sV");
        }
        if mode == OutputMode::Xml {
            if self.os_detection {
                args.push("-O");
            }
            args.extend(["-oX", "-"]);
        }
        args
    }
}

/// Raw output of a successful scanner run.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stdout: String,
    /// Diagnostics the scanner printed; already logged.
    pub stderr: String,
    pub elapsed: Duration,
}

/// Something that can produce raw scanner output for a target.
///
/// The engine depends on this trait rather than on a process, so tests and
/// embedders can supply canned output.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Run one scan. Implementations spawn at most one process and never retry.
    async fn run(&self, target: &ScanTarget, mode: OutputMode) -> Result<RawOutput, ScanFailure>;
}

/// A boxed runner for dynamic dispatch.
pub type BoxedRunner = Box<dyn ScanRunner>;

/// Runs the real scanner executable.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Create a runner with the given invocation policy.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// The invocation policy of this runner.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Build the command line for `target` in `mode`.
    pub fn command(&self, target: &ScanTarget, mode: OutputMode) -> Command {
        let mut command = Command::new(&self.config.scanner_path);
        command.args(self.config.arguments(mode)).arg(target);
        command
    }
}

#[async_trait]
impl ScanRunner for ProcessRunner {
    async fn run(&self, target: &ScanTarget, mode: OutputMode) -> Result<RawOutput, ScanFailure> {
        info!(
            scanner = %self.config.scanner_path.display(),
            target = %target,
            mode = %mode,
            "launching scanner"
        );
        execute(
            self.command(target, mode),
            self.config.timeout,
            self.config.max_output_bytes,
        )
        .await
    }
}
