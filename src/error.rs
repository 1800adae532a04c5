//! Error types for scanvault.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure a scan can
//! end in is a `ScanFailure`; parse problems nest inside it as `ParseFailure`.

use crate::types::{ScanIdError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of bytes of scanner stderr carried inside an error.
pub const STDERR_EXCERPT_LIMIT: usize = 512;

/// Why scanner output could not be turned into a scan result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no host report found in scanner output")]
    NoHostFound,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Terminal failure of a single scan invocation.
#[derive(Error, Debug)]
pub enum ScanFailure {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("scanner exited with {}: {}", describe_exit(.exit_code), .stderr_excerpt)]
    ScannerExecutionFailed {
        exit_code: Option<i32>,
        stderr_excerpt: String,
    },

    #[error("scanner did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("scanner output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("failed to parse scanner output: {0}")]
    Parse(#[from] ParseFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanFailure {
    /// Stable short name of the failure, suitable for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_) => "invalid_target",
            Self::ScannerExecutionFailed { .. } => "execution_failed",
            Self::Timeout(_) => "timeout",
            Self::OutputTooLarge { .. } => "output_too_large",
            Self::Parse(_) => "parse_failure",
            Self::Io(_) => "io",
        }
    }

    /// Build an execution failure, keeping only a bounded excerpt of stderr.
    pub fn execution_failed(exit_code: Option<i32>, stderr: &str) -> Self {
        Self::ScannerExecutionFailed {
            exit_code,
            stderr_excerpt: excerpt(stderr, STDERR_EXCERPT_LIMIT),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

/// Truncate `text` to at most `limit` bytes without splitting a character.
pub fn excerpt(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.len() <= limit {
        return text.to_string();
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Errors from loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {}: {}", .path.display(), .reason)]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {}: {}", .path.display(), .reason)]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the scan store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("ambiguous scan ID prefix '{prefix}': {matches} matches")]
    AmbiguousPrefix { prefix: String, matches: usize },

    #[error("failed to save scan: {0}")]
    SaveFailed(String),

    #[error("failed to load scan: {0}")]
    LoadFailed(String),

    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Top-level error for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{} ({})", .0, .0.kind())]
    Scan(#[from] ScanFailure),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    ScanId(#[from] ScanIdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;
