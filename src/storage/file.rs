//! File-backed storage
//!
//! Layout under the data directory:
//! - `sessions/{id}.json` - one wizard session snapshot per file
//! - `usage.json` - usage counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{validate_session_id, SessionStorage, StorageError, StorageResult, UsageStats};
use crate::wizard::WizardSession;

/// Version of the session file format
const SESSION_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    version: u32,
    updated_at: DateTime<Utc>,
    session: WizardSession,
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> StorageResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            StorageError::Io(format!("Failed to create directory {:?}: {}", path, e))
        })?;
    }
    Ok(())
}

/// Write data to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, content: &str) -> StorageResult<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content).map_err(|e| {
        StorageError::Io(format!("Failed to write temp file {:?}: {}", temp_path, e))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        StorageError::Io(format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e))
    })?;

    Ok(())
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read file {:?}: {}", path, e)))?;

    serde_json::from_str(&content)
        .map_err(|e| StorageError::Serde(format!("Failed to parse JSON from {:?}: {}", path, e)))
}

/// Write data as pretty-printed JSON atomically
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> StorageResult<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| StorageError::Serde(format!("Failed to serialize to JSON: {}", e)))?;

    atomic_write(path, &content)
}

pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        ensure_dir(&data_dir.join("sessions"))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    fn session_path(&self, id: &str) -> StorageResult<PathBuf> {
        validate_session_id(id)?;
        Ok(self.sessions_dir().join(format!("{}.json", id)))
    }

    fn usage_path(&self) -> PathBuf {
        self.data_dir.join("usage.json")
    }
}

impl SessionStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn save_session(&self, session: &WizardSession) -> StorageResult<()> {
        let path = self.session_path(&session.id)?;
        let file = SessionFile {
            version: SESSION_FILE_VERSION,
            updated_at: Utc::now(),
            session: session.clone(),
        };
        write_json(&path, &file)?;
        log::debug!("Saved wizard session {} to {:?}", session.id, path);
        Ok(())
    }

    fn load_session(&self, id: &str) -> StorageResult<Option<WizardSession>> {
        let path = self.session_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let file: SessionFile = read_json(&path)?;
        Ok(Some(file.session))
    }

    fn list_sessions(&self) -> StorageResult<Vec<WizardSession>> {
        let dir = self.sessions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::Io(format!("Failed to read directory {:?}: {}", dir, e)))?;

        let mut sessions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<SessionFile>(&path) {
                Ok(file) => sessions.push(file.session),
                Err(e) => log::warn!("Skipping unreadable session file: {}", e),
            }
        }

        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }

    fn delete_session(&self, id: &str) -> StorageResult<()> {
        let path = self.session_path(id)?;
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {:?}: {}", path, e)))?;
        }
        Ok(())
    }

    fn load_usage(&self) -> StorageResult<UsageStats> {
        let path = self.usage_path();
        if !path.exists() {
            return Ok(UsageStats::default());
        }
        read_json(&path)
    }

    fn save_usage(&self, stats: &UsageStats) -> StorageResult<()> {
        write_json(&self.usage_path(), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_round_trip() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();

        let session = WizardSession::with_id("session-1");
        storage.save_session(&session).unwrap();

        assert!(temp.path().join("sessions/session-1.json").exists());
        assert!(!temp.path().join("sessions/session-1.tmp").exists());

        let loaded = storage.load_session("session-1").unwrap().unwrap();
        assert_eq!(loaded.id, "session-1");
        assert_eq!(loaded.step, session.step);
    }

    #[test]
    fn test_missing_session_is_none() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        assert!(storage.load_session("nope").unwrap().is_none());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        assert!(matches!(
            storage.load_session("../secrets"),
            Err(StorageError::InvalidId(_))
        ));
    }

    #[test]
    fn test_list_skips_corrupt_files() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        storage.save_session(&WizardSession::with_id("good")).unwrap();
        fs::write(temp.path().join("sessions/bad.json"), "{not json").unwrap();

        let sessions = storage.list_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
    }

    #[test]
    fn test_usage_defaults_then_persists() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path()).unwrap();
        assert_eq!(storage.load_usage().unwrap(), UsageStats::default());

        let mut stats = UsageStats::default();
        stats.record_submission();
        storage.save_usage(&stats).unwrap();

        let reopened = FileStorage::new(temp.path()).unwrap();
        assert_eq!(reopened.load_usage().unwrap().problems_submitted, 1);
    }
}
