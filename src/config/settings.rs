//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data. Paths are resolved
//! once by the caller and passed down rather than kept in a global.

use crate::error::{ConfigError, ConfigResult};
use crate::runner::{OutputMode, RunnerConfig, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/scanvault)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/scanvault)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories, creating them if needed.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "scanvault", "scanvault").ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the scans storage directory.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Scanner executable name or path.
    pub scanner_path: PathBuf,
    /// Scanner wall-clock limit in seconds.
    pub timeout_secs: u64,
    /// Maximum scanner stdout in bytes.
    pub max_output_bytes: usize,
    /// Output mode used when none is given on the command line.
    pub default_mode: OutputMode,
    /// Probe service versions.
    pub service_detection: bool,
    /// Request OS detection in XML mode.
    pub os_detection: bool,
    /// Persist every successful scan.
    pub auto_save: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            scanner_path: PathBuf::from("nmap"),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            default_mode: OutputMode::default(),
            service_detection: true,
            os_detection: false,
            auto_save: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no settings file exists.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to `path`.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The scanner invocation policy described by these settings.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            scanner_path: self.scanner_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_output_bytes: self.max_output_bytes,
            service_detection: self.service_detection,
            os_detection: self.os_detection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.timeout_secs, 300);
        assert_eq!(settings.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.default_mode, OutputMode::Xml);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, r#"{ "timeout_secs": 30, "default_mode": "text" }"#).unwrap();

        let settings = AppSettings::load_from(&file).unwrap();
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.default_mode, OutputMode::Text);
        assert_eq!(settings.scanner_path, PathBuf::from("nmap"));
        assert!(settings.auto_save);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, "{ not json").unwrap();

        assert!(matches!(
            AppSettings::load_from(&file),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        let settings = AppSettings {
            os_detection: true,
            ..AppSettings::default()
        };
        settings.save_to(&file).unwrap();

        let reloaded = AppSettings::load_from(&file).unwrap();
        assert!(reloaded.os_detection);
    }

    #[test]
    fn test_runner_config() {
        let settings = AppSettings {
            timeout_secs: 12,
            scanner_path: PathBuf::from("/opt/nmap/bin/nmap"),
            ..AppSettings::default()
        };
        let config = settings.runner_config();
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.scanner_path, PathBuf::from("/opt/nmap/bin/nmap"));
        assert!(!config.os_detection);
    }
}
