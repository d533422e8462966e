use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::TutorialError;

/// Authenticated caller of the tutorial proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Principal, TutorialError>;
}

/// Resolves bearer tokens with `GET {url}/auth/v1/user`
pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuth {
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
impl PrincipalResolver for SupabaseAuth {
    async fn resolve(&self, token: &str) -> Result<Principal, TutorialError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| TutorialError::Http(format!("Auth request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorialError::Unauthorized(if body.is_empty() {
                format!("auth service returned {}", status)
            } else {
                body
            }));
        }

        response
            .json::<Principal>()
            .await
            .map_err(|e| TutorialError::Unauthorized(format!("Invalid user payload: {}", e)))
    }
}
