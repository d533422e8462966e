//! Session storage
//!
//! Wizard snapshots and usage counters go through the `SessionStorage`
//! trait so the manager never knows whether it is talking to memory or disk.
//!
//! - `memory`: process-local maps, the default backend
//! - `file`: one JSON file per session under a data directory

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::wizard::WizardSession;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Failed to (de)serialize stored data: {0}")]
    Serde(String),

    #[error("Storage lock poisoned: {0}")]
    Lock(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Session-level usage counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub problems_submitted: u64,
    pub solutions_generated: u64,
    pub exports: u64,
    /// Solutions generated per model id
    pub model_usage: BTreeMap<String, u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UsageStats {
    pub fn record_submission(&mut self) {
        self.problems_submitted += 1;
        self.touch();
    }

    pub fn record_solutions<'a>(&mut self, model_ids: impl IntoIterator<Item = &'a str>) {
        for id in model_ids {
            self.solutions_generated += 1;
            *self.model_usage.entry(id.to_string()).or_insert(0) += 1;
        }
        self.touch();
    }

    pub fn record_export(&mut self) {
        self.exports += 1;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Ids end up in file names, so only a conservative alphabet is accepted
pub fn validate_session_id(id: &str) -> StorageResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_string()))
    }
}

pub trait SessionStorage: Send + Sync {
    fn name(&self) -> &str;

    fn save_session(&self, session: &WizardSession) -> StorageResult<()>;

    fn load_session(&self, id: &str) -> StorageResult<Option<WizardSession>>;

    fn list_sessions(&self) -> StorageResult<Vec<WizardSession>>;

    fn delete_session(&self, id: &str) -> StorageResult<()>;

    fn load_usage(&self) -> StorageResult<UsageStats>;

    fn save_usage(&self, stats: &UsageStats) -> StorageResult<()>;
}
