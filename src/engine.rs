//! The scan pipeline: validate target, run scanner, parse, normalize.

use crate::error::ScanFailure;
use crate::normalize::normalize;
use crate::parser;
use crate::runner::{BoxedRunner, OutputMode, ProcessRunner, RunnerConfig, ScanRunner};
use crate::types::{ScanResult, ScanTarget};
use tracing::{debug, info, warn};

/// Drives one scan per call. Calls share no mutable state, so an engine can
/// serve concurrent scans; capping concurrency is left to the caller.
pub struct ScanEngine {
    runner: BoxedRunner,
}

impl ScanEngine {
    /// Create an engine on top of any runner.
    pub fn new(runner: impl ScanRunner + 'static) -> Self {
        Self {
            runner: Box::new(runner),
        }
    }

    /// Create an engine that launches the real scanner with `config`.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self::new(ProcessRunner::new(config))
    }

    /// Scan `target` and return the finalized result.
    ///
    /// The target is validated before anything is launched. Failures are
    /// returned as-is; retrying is the caller's decision.
    pub async fn scan(&self, target: &str, mode: OutputMode) -> Result<ScanResult, ScanFailure> {
        let target = ScanTarget::parse(target).map_err(|e| {
            warn!("rejected scan target: {}", e);
            ScanFailure::from(e)
        })?;
        self.scan_target(&target, mode).await
    }

    /// Scan an already validated target.
    pub async fn scan_target(
        &self,
        target: &ScanTarget,
        mode: OutputMode,
    ) -> Result<ScanResult, ScanFailure> {
        let raw = self.runner.run(target, mode).await?;
        debug!(
            bytes = raw.stdout.len(),
            elapsed_ms = raw.elapsed.as_millis() as u64,
            "scanner output captured"
        );

        let draft = parser::parse(&raw.stdout, mode).map_err(|e| {
            warn!(target = %target, mode = %mode, "could not parse scanner output: {}", e);
            e
        })?;
        let result = normalize(draft);

        info!(
            target = %target,
            address = %result.host.address,
            status = %result.host.status,
            ports = result.ports.len(),
            "scan complete"
        );
        Ok(result)
    }
}
