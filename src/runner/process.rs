//! Child process execution with a wall-clock timeout and an output cap.
//!
//! The scanner is killed outright when either limit is hit; it has no
//! graceful shutdown protocol worth waiting for.

use super::RawOutput;
use crate::error::ScanFailure;
use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Bytes of stderr kept in memory; the rest is drained and discarded.
const STDERR_RETAIN_LIMIT: usize = 64 * 1024;

/// Run `command` to completion and capture its output.
///
/// Fails with `Timeout` when the process outlives `limit`, with
/// `OutputTooLarge` when stdout exceeds `max_output_bytes`, and with
/// `ScannerExecutionFailed` when it cannot be launched or exits non-zero.
pub async fn execute(
    mut command: Command,
    limit: Duration,
    max_output_bytes: usize,
) -> Result<RawOutput, ScanFailure> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("Running scanner command: {:?}", command);
    let started = Instant::now();

    let mut child = command.spawn().map_err(|e| {
        ScanFailure::execution_failed(None, &format!("failed to launch scanner: {}", e))
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "failed to capture stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "failed to capture stderr"))?;

    let collect = async {
        let (stdout, stderr) = tokio::try_join!(
            read_limited(stdout, max_output_bytes),
            read_retained(stderr, STDERR_RETAIN_LIMIT),
        )?;
        let status = child.wait().await?;
        Ok::<_, ScanFailure>((stdout, stderr, status))
    };
    let outcome = timeout(limit, collect).await;

    let (stdout, stderr, status) = match outcome {
        Ok(Ok(finished)) => finished,
        Ok(Err(failure)) => {
            terminate(&mut child).await;
            return Err(failure);
        }
        Err(_) => {
            terminate(&mut child).await;
            return Err(ScanFailure::Timeout(limit));
        }
    };

    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
        warn!(target: "scanvault::scanner", "{}", line);
    }

    if !status.success() {
        return Err(ScanFailure::execution_failed(status.code(), &stderr));
    }

    let elapsed = started.elapsed();
    debug!(
        bytes = stdout.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "scanner finished"
    );

    Ok(RawOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr,
        elapsed,
    })
}

/// Read everything, failing as soon as more than `limit` bytes arrive.
async fn read_limited<R>(reader: R, limit: usize) -> Result<Vec<u8>, ScanFailure>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buffer)
        .await?;

    if buffer.len() > limit {
        return Err(ScanFailure::OutputTooLarge { limit });
    }
    Ok(buffer)
}

/// Keep the first `keep` bytes and drain the rest so the child never blocks.
async fn read_retained<R>(mut reader: R, keep: usize) -> Result<Vec<u8>, ScanFailure>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    (&mut reader)
        .take(keep as u64)
        .read_to_end(&mut buffer)
        .await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(buffer)
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!("failed to kill scanner process: {}", e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[tokio::test]
    async fn test_timeout_kills_long_running_process() {
        let mut command = Command::new("sleep");
        command.arg("5");

        let started = Instant::now();
        let result = execute(command, Duration::from_millis(1), 1024).await;

        assert!(matches!(result, Err(ScanFailure::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_output_over_limit_fails() {
        let command = shell("head -c 100000 /dev/zero");
        let result = execute(command, Duration::from_secs(10), 1024).await;

        assert!(matches!(
            result,
            Err(ScanFailure::OutputTooLarge { limit: 1024 })
        ));
    }

    #[tokio::test]
    async fn test_output_at_limit_succeeds() {
        let command = shell("printf 'abcd'");
        let output = execute(command, Duration::from_secs(10), 4).await.unwrap();

        assert_eq!(output.stdout, "abcd");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr_excerpt() {
        let command = shell("echo 'Failed to resolve \"nowhere\".' >&2; exit 3");
        let result = execute(command, Duration::from_secs(10), 1024).await;

        match result {
            Err(ScanFailure::ScannerExecutionFailed {
                exit_code,
                stderr_excerpt,
            }) => {
                assert_eq!(exit_code, Some(3));
                assert!(stderr_excerpt.contains("Failed to resolve"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stderr_diagnostics_are_not_fatal() {
        let command = shell("echo 'Host is up.'; echo 'Warning: RTTVAR has grown' >&2");
        let output = execute(command, Duration::from_secs(10), 1024).await.unwrap();

        assert_eq!(output.stdout, "Host is up.\n");
        assert!(output.stderr.contains("RTTVAR"));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let command = Command::new("/nonexistent/scanvault-test-scanner");
        let result = execute(command, Duration::from_secs(1), 1024).await;

        assert!(matches!(
            result,
            Err(ScanFailure::ScannerExecutionFailed {
                exit_code: None,
                ..
            })
        ));
    }
}
