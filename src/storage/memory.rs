use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionStorage, StorageError, StorageResult, UsageStats};
use crate::wizard::WizardSession;

/// Process-local storage; everything is lost on restart
#[derive(Default)]
pub struct InMemoryStorage {
    sessions: RwLock<HashMap<String, WizardSession>>,
    usage: RwLock<UsageStats>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Lock(e.to_string())
}

impl SessionStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn save_session(&self, session: &WizardSession) -> StorageResult<()> {
        self.sessions
            .write()
            .map_err(lock_err)?
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn load_session(&self, id: &str) -> StorageResult<Option<WizardSession>> {
        Ok(self.sessions.read().map_err(lock_err)?.get(id).cloned())
    }

    fn list_sessions(&self) -> StorageResult<Vec<WizardSession>> {
        let mut sessions: Vec<WizardSession> =
            self.sessions.read().map_err(lock_err)?.values().cloned().collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }

    fn delete_session(&self, id: &str) -> StorageResult<()> {
        self.sessions.write().map_err(lock_err)?.remove(id);
        Ok(())
    }

    fn load_usage(&self) -> StorageResult<UsageStats> {
        Ok(self.usage.read().map_err(lock_err)?.clone())
    }

    fn save_usage(&self, stats: &UsageStats) -> StorageResult<()> {
        *self.usage.write().map_err(lock_err)? = stats.clone();
        Ok(())
    }
}
