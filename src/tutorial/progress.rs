use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::prompt::module_id;
use super::{Principal, TutorRequest, TutorialError};

/// One row of `user_progress`, unique per `(user_id, module_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub module_id: String,
    pub level: String,
    pub topic: String,
    pub status: String,
    pub progress: Value,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn started(principal: &Principal, request: &TutorRequest) -> Self {
        Self {
            user_id: principal.id.clone(),
            module_id: module_id(&request.topic, &request.level),
            level: request.level.trim().to_string(),
            topic: request.topic.trim().to_string(),
            status: "in_progress".to_string(),
            progress: request.user_progress.clone(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert or merge the record keyed by `(user_id, module_id)`
    async fn upsert(&self, record: &ProgressRecord) -> Result<(), TutorialError>;
}

/// PostgREST upsert into `user_progress`
pub struct PostgrestProgressStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestProgressStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, TutorialError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| TutorialError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ProgressStore for PostgrestProgressStore {
    async fn upsert(&self, record: &ProgressRecord) -> Result<(), TutorialError> {
        let response = self
            .client
            .post(format!("{}/rest/v1/user_progress", self.base_url))
            .query(&[("on_conflict", "user_id,module_id")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[record])
            .send()
            .await
            .map_err(|e| TutorialError::Progress(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorialError::Progress(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}

/// Keeps progress in memory; used when no database is configured
#[derive(Default)]
pub struct InMemoryProgressStore {
    records: Mutex<HashMap<(String, String), ProgressRecord>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ProgressRecord> {
        match self.records.lock() {
            Ok(records) => records.values().cloned().collect(),
            Err(e) => {
                log::warn!("Progress store lock poisoned: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn upsert(&self, record: &ProgressRecord) -> Result<(), TutorialError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| TutorialError::Progress(format!("Failed to acquire lock: {}", e)))?;
        records.insert(
            (record.user_id.clone(), record.module_id.clone()),
            record.clone(),
        );
        Ok(())
    }
}
