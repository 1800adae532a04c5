//! JSON-based scan result storage.
//!
//! Stores each scan as a separate JSON file. The store assigns identifiers;
//! the scan result itself is stored exactly as the engine produced it.

use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use crate::types::{ScanId, ScanResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A persisted scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Unique identifier for this scan.
    pub id: ScanId,
    /// Target as the user supplied it.
    pub target: String,
    /// When the scan was stored.
    pub saved_at: DateTime<Utc>,
    /// The normalized scan result.
    pub result: ScanResult,
}

impl ScanRecord {
    /// Wrap a finished result with a fresh identifier.
    pub fn new(target: impl Into<String>, result: ScanResult) -> Self {
        Self {
            id: ScanId::new(),
            target: target.into(),
            saved_at: Utc::now(),
            result,
        }
    }

    /// Number of open ports in the result.
    pub fn open_ports(&self) -> usize {
        self.result.open_ports().count()
    }

    /// Get a short summary of the scan.
    pub fn summary(&self) -> String {
        let host = &self.result.host;
        let address = if host.address.is_empty() {
            "no address"
        } else {
            host.address.as_str()
        };
        format!(
            "{} ({}) - {}, {} open of {} ports",
            self.target,
            address,
            host.status,
            self.open_ports(),
            self.result.ports.len()
        )
    }
}

/// JSON file-based scan storage.
pub struct ScanStore {
    scans_dir: PathBuf,
}

impl ScanStore {
    /// Open the store in the default data directory.
    pub fn new(paths: &Paths) -> StorageResult<Self> {
        Self::at(paths.scans_dir())
    }

    /// Open a store rooted at `scans_dir`, creating it if needed.
    pub fn at(scans_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let scans_dir = scans_dir.into();
        fs::create_dir_all(&scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { scans_dir })
    }

    /// Persist a scan result, returning the stored record.
    pub fn save(&self, target: &str, result: &ScanResult) -> StorageResult<ScanRecord> {
        let record = ScanRecord::new(target, result.clone());
        let content = serde_json::to_string_pretty(&record)?;

        fs::write(self.scan_file(&record.id), content)
            .map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        debug!(id = %record.id, "scan saved");
        Ok(record)
    }

    /// Load a scan record by ID.
    pub fn load(&self, id: &ScanId) -> StorageResult<ScanRecord> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a scan by full ID or unambiguous ID prefix.
    pub fn find(&self, id_or_prefix: &str) -> StorageResult<ScanRecord> {
        if let Ok(id) = id_or_prefix.parse::<ScanId>() {
            return self.load(&id);
        }
        self.find_by_prefix(id_or_prefix)
    }

    /// Find a scan by short ID prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ScanRecord> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(StorageError::ScanNotFound(String::new()));
        }

        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(StorageError::ScanNotFound(prefix.to_string())),
            [id] => self.load(id),
            _ => Err(StorageError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }

    /// List all scan IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ScanId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.scans_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    if let Ok(id) = stem.to_string_lossy().parse::<ScanId>() {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// List all scan records, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> StorageResult<Vec<ScanRecord>> {
        let mut records = Vec::new();

        for id in self.list_ids()? {
            match self.load(&id) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping stored scan {}: {}", id, e),
            }
        }

        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(records)
    }

    /// List recent scans (last n).
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ScanRecord>> {
        let mut records = self.list()?;
        records.truncate(count);
        Ok(records)
    }

    /// Delete a scan record.
    pub fn delete(&self, id: &ScanId) -> StorageResult<()> {
        let file = self.scan_file(id);

        if !file.exists() {
            return Err(StorageError::ScanNotFound(id.to_string()));
        }

        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete every stored scan, returning how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let ids = self.list_ids()?;
        for id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    fn scan_file(&self, id: &ScanId) -> PathBuf {
        self.scans_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HostInfo, HostStatus, Port, PortRecord, PortState, Transport};

    fn sample() -> ScanResult {
        ScanResult {
            scanner_version: "7.97".to_string(),
            scan_timestamp: "2025-08-28 12:50 +0530".to_string(),
            host: HostInfo {
                hostname: "host.local".to_string(),
                address: "10.0.0.5".to_string(),
                status: HostStatus::Up,
                latency_seconds: 0.25,
            },
            ports: vec![
                PortRecord::new(Port::new(22).unwrap(), Transport::Tcp, PortState::Open, "ssh")
                    .with_version("OpenSSH 8.9"),
                PortRecord::new(Port::new(25).unwrap(), Transport::Tcp, PortState::Closed, "smtp"),
            ],
            ..ScanResult::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path()).unwrap();

        let record = store.save("host.local", &sample()).unwrap();
        let loaded = store.load(&record.id).unwrap();

        assert_eq!(loaded, record);
        assert_eq!(loaded.result.ports[0].version_info.as_deref(), Some("OpenSSH 8.9"));
    }

    #[test]
    fn test_find_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path()).unwrap();
        let record = store.save("host.local", &sample()).unwrap();

        let found = store.find(&record.id.short()).unwrap();
        assert_eq!(found.id, record.id);
        let found = store.find(&record.id.to_string()).unwrap();
        assert_eq!(found.id, record.id);

        assert!(matches!(
            store.find_by_prefix("zzzz"),
            Err(StorageError::ScanNotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path()).unwrap();

        let first = store.save("a", &sample()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.save("b", &sample()).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
        assert_eq!(store.list_recent(1).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path()).unwrap();

        let record = store.save("a", &sample()).unwrap();
        store.save("b", &sample()).unwrap();

        store.delete(&record.id).unwrap();
        assert!(matches!(
            store.load(&record.id),
            Err(StorageError::ScanNotFound(_))
        ));
        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_skipped_in_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScanStore::at(dir.path()).unwrap();
        store.save("a", &sample()).unwrap();
        fs::write(dir.path().join(format!("{}.json", ScanId::new())), "{").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_summary() {
        let record = ScanRecord::new("host.local", sample());
        assert_eq!(record.open_ports(), 1);
        assert_eq!(record.summary(), "host.local (10.0.0.5) - up, 1 open of 2 ports");
    }
}
