//! Catalog sources
//!
//! A source yields the raw catalog. `load_catalog` wraps any source with the
//! fallback rule: a failed or empty fetch is replaced by the fixed list.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::builtin::{builtin_catalog, fallback_catalog};
use crate::models::MentalModel;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Catalog service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Failed to read catalog file {path:?}: {message}")]
    File { path: PathBuf, message: String },
}

/// Where the catalog comes from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError>;
}

/// Which catalog is in use and why
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    Source,
    Fallback,
}

/// Result of loading a catalog through the fallback rule
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedCatalog {
    pub models: Vec<MentalModel>,
    pub origin: CatalogOrigin,
    /// Message explaining why the fallback was used
    pub warning: Option<String>,
}

/// Fetch from `source`, substituting the fallback list on failure or empty result
pub async fn load_catalog(source: &dyn CatalogSource) -> LoadedCatalog {
    match source.fetch().await {
        Ok(models) if !models.is_empty() => {
            log::info!(
                "Loaded {} mental models from {}",
                models.len(),
                source.name()
            );
            LoadedCatalog {
                models,
                origin: CatalogOrigin::Source,
                warning: None,
            }
        }
        Ok(_) => {
            log::warn!(
                "Catalog source {} returned no models, using fallback catalog",
                source.name()
            );
            LoadedCatalog {
                models: fallback_catalog(),
                origin: CatalogOrigin::Fallback,
                warning: Some(format!("{} returned no models", source.name())),
            }
        }
        Err(e) => {
            log::warn!(
                "Catalog source {} failed, using fallback catalog: {}",
                source.name(),
                e
            );
            LoadedCatalog {
                models: fallback_catalog(),
                origin: CatalogOrigin::Fallback,
                warning: Some(e.to_string()),
            }
        }
    }
}

// =============================================================================
// Built-in
// =============================================================================

/// Serves the compiled-in catalog
pub struct BuiltinCatalogSource;

#[async_trait]
impl CatalogSource for BuiltinCatalogSource {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError> {
        Ok(builtin_catalog())
    }
}

// =============================================================================
// JSON file
// =============================================================================

/// Reads a JSON array of models from disk
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| CatalogError::File {
                    path: self.path.clone(),
                    message: e.to_string(),
                })?;

        let mut models: Vec<MentalModel> =
            serde_json::from_str(&content).map_err(|e| CatalogError::Parse(e.to_string()))?;
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }
}

// =============================================================================
// Remote table (PostgREST-style)
// =============================================================================

/// Reads the `mental_models` table ordered by name
pub struct RemoteCatalogSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteCatalogSource {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| CatalogError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/mental_models", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for RemoteCatalogSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError> {
        let mut request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "name.asc")]);

        if let Some(ref key) = self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        response
            .json::<Vec<MentalModel>>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::filter::{filter_models, FilterCriteria};

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError> {
            Err(CatalogError::Request("connection refused".to_string()))
        }
    }

    struct EmptySource;

    #[async_trait]
    impl CatalogSource for EmptySource {
        fn name(&self) -> &str {
            "empty"
        }

        async fn fetch(&self) -> Result<Vec<MentalModel>, CatalogError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_uses_fallback() {
        let loaded = load_catalog(&FailingSource).await;
        assert_eq!(loaded.origin, CatalogOrigin::Fallback);
        assert!(loaded.warning.unwrap().contains("connection refused"));

        let view = filter_models(&loaded.models, &FilterCriteria::default());
        assert_eq!(view.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_fetch_uses_fallback() {
        let loaded = load_catalog(&EmptySource).await;
        assert_eq!(loaded.origin, CatalogOrigin::Fallback);
        assert_eq!(loaded.models, fallback_catalog());
    }

    #[tokio::test]
    async fn test_builtin_source() {
        let loaded = load_catalog(&BuiltinCatalogSource).await;
        assert_eq!(loaded.origin, CatalogOrigin::Source);
        assert_eq!(loaded.models.len(), builtin_catalog().len());
        assert!(loaded.warning.is_none());
    }

    #[tokio::test]
    async fn test_file_source_sorts_by_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let models = vec![
            builtin_catalog().remove(4), // Occam's Razor
            builtin_catalog().remove(0), // First-Principles Thinking
        ];
        std::fs::write(&path, serde_json::to_string(&models).unwrap()).unwrap();

        let loaded = load_catalog(&FileCatalogSource::new(&path)).await;
        assert_eq!(loaded.origin, CatalogOrigin::Source);
        assert_eq!(loaded.models[0].id, "first-principles");
        assert_eq!(loaded.models[1].id, "occams-razor");
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let loaded = load_catalog(&FileCatalogSource::new("/nonexistent/catalog.json")).await;
        assert_eq!(loaded.origin, CatalogOrigin::Fallback);
    }
}
