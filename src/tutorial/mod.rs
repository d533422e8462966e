//! Tutorial proxy
//!
//! Resolves the caller's bearer token to a principal, asks a hosted
//! generative model for a tutorial, parses the reply into `TutorialContent`
//! and upserts one progress record per `(user_id, module_id)`.
//!
//! - `auth`: bearer → principal resolution
//! - `llm`: generative model client
//! - `prompt`: prompt construction and reply parsing
//! - `progress`: progress record stores

pub mod auth;
pub mod llm;
pub mod progress;
pub mod prompt;

pub use auth::{Principal, PrincipalResolver, SupabaseAuth};
pub use llm::{GeminiClient, GenerativeClient};
pub use progress::{InMemoryProgressStore, PostgrestProgressStore, ProgressRecord, ProgressStore};
pub use prompt::{build_prompt, module_id, parse_tutorial};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorialError {
    #[error("Missing authorization header")]
    MissingAuthorization,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid tutorial request: {0}")]
    InvalidRequest(String),

    #[error("Tutorial proxy is not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Http(String),

    #[error("Model API returned {status}: {body}")]
    Llm { status: u16, body: String },

    #[error("Model returned no content: {0}")]
    EmptyReply(String),

    #[error("Failed to parse tutorial: {0}")]
    InvalidReply(String),

    #[error("Failed to save progress: {0}")]
    Progress(String),
}

/// Body of `POST /functions/v1/generate-tutorial`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    pub level: String,
    pub topic: String,
    #[serde(default)]
    pub user_progress: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialSection {
    pub heading: String,
    pub content: String,
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialExercise {
    pub question: String,
    #[serde(default)]
    pub hint: Option<String>,
}

/// Fixed tutorial schema the model is asked to produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialContent {
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub sections: Vec<TutorialSection>,
    #[serde(default)]
    pub exercises: Vec<TutorialExercise>,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

/// `{success, data|error, timestamp}` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TutorialContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TutorResponse {
    pub fn success(data: TutorialContent) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Extract the token from an `Authorization: Bearer ...` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, TutorialError> {
    let value = header.ok_or(TutorialError::MissingAuthorization)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    if token.is_empty() {
        return Err(TutorialError::MissingAuthorization);
    }
    Ok(token)
}

pub struct TutorService {
    auth: Arc<dyn PrincipalResolver>,
    llm: Arc<dyn GenerativeClient>,
    progress: Arc<dyn ProgressStore>,
}

impl TutorService {
    pub fn new(
        auth: Arc<dyn PrincipalResolver>,
        llm: Arc<dyn GenerativeClient>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            auth,
            llm,
            progress,
        }
    }

    /// Run one tutorial request end to end. No step is retried.
    pub async fn generate(
        &self,
        authorization: Option<&str>,
        request: &TutorRequest,
    ) -> Result<TutorialContent, TutorialError> {
        let token = bearer_token(authorization)?;
        let principal = self.auth.resolve(token).await?;

        if request.topic.trim().is_empty() {
            return Err(TutorialError::InvalidRequest("topic is required".to_string()));
        }
        if request.level.trim().is_empty() {
            return Err(TutorialError::InvalidRequest("level is required".to_string()));
        }

        log::info!(
            "Generating {} tutorial on {:?} for user {} with {}",
            request.level,
            request.topic,
            principal.id,
            self.llm.model()
        );

        let prompt = build_prompt(request)?;
        let reply = self.llm.generate(&prompt).await?;
        let content = parse_tutorial(&reply)?;

        let record = ProgressRecord::started(&principal, request);
        self.progress.upsert(&record).await?;
        log::debug!("Saved progress for {} / {}", record.user_id, record.module_id);

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("abc")).unwrap(), "abc");
        assert!(matches!(
            bearer_token(None),
            Err(TutorialError::MissingAuthorization)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer  ")),
            Err(TutorialError::MissingAuthorization)
        ));
    }

    #[test]
    fn test_response_envelope_shape() {
        let value = serde_json::to_value(TutorResponse::error("nope")).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "nope");
        assert!(value.get("data").is_none());
        assert!(value["timestamp"].is_string());
    }
}
