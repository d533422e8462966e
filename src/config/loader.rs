// Configuration file loading
// Priority order: CLI flags -> environment -> config file -> defaults

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::AppConfig;
use crate::utils::default_config_path;

/// Values given on the command line; `None` leaves the lower layer alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub token: Option<String>,
    pub seed: Option<u64>,
}

/// Load a config file. A missing default file is not an error; a missing
/// explicit file is.
pub fn load_file(path: Option<&Path>) -> Result<AppConfig> {
    let (path, explicit): (PathBuf, bool) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    if !path.exists() {
        if explicit {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow!("Invalid value for {}: {}", name, e))
}

/// Apply `MM_*` variables resolved through `lookup`
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("MM_PORT") {
        config.server.port = parse_var("MM_PORT", &v)?;
    }
    if let Some(v) = var("MM_BIND") {
        config.server.bind = v;
    }
    if let Some(v) = var("MM_CORS_ORIGINS") {
        config.server.cors_origins = v
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Some(v) = var("MM_SERVER_TOKEN") {
        config.server.token = Some(v);
    }

    if let Some(v) = var("MM_CATALOG_SOURCE") {
        config.catalog.source = parse_var("MM_CATALOG_SOURCE", &v)?;
    }
    if let Some(v) = var("MM_CATALOG_URL") {
        config.catalog.url = Some(v);
    }
    if let Some(v) = var("MM_CATALOG_API_KEY") {
        config.catalog.api_key = Some(v);
    }
    if let Some(v) = var("MM_CATALOG_PATH") {
        config.catalog.path = Some(PathBuf::from(v));
    }

    if let Some(v) = var("MM_ANALYSIS_MODE") {
        config.analysis.mode = parse_var("MM_ANALYSIS_MODE", &v)?;
    }
    if let Some(v) = var("MM_ANALYSIS_ENDPOINT") {
        config.analysis.endpoint = Some(v);
    }
    if let Some(v) = var("MM_ANALYSIS_API_KEY") {
        config.analysis.api_key = Some(v);
    }
    if let Some(v) = var("MM_SEED") {
        config.analysis.seed = Some(parse_var("MM_SEED", &v)?);
    }

    if let Some(v) = var("MM_LLM_BASE_URL") {
        config.tutorial.llm_base_url = v;
    }
    if let Some(v) = var("MM_LLM_MODEL") {
        config.tutorial.llm_model = v;
    }
    if let Some(v) = var("MM_LLM_API_KEY") {
        config.tutorial.llm_api_key = Some(v);
    }
    if let Some(v) = var("MM_AUTH_URL") {
        config.tutorial.auth_url = Some(v);
    }
    if let Some(v) = var("MM_AUTH_API_KEY") {
        config.tutorial.auth_api_key = Some(v);
    }

    if let Some(v) = var("MM_STORAGE_BACKEND") {
        config.storage.backend = parse_var("MM_STORAGE_BACKEND", &v)?;
    }
    if let Some(v) = var("MM_DATA_DIR") {
        config.storage.data_dir = Some(PathBuf::from(v));
    }

    Ok(())
}

pub fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(ref bind) = overrides.bind {
        config.server.bind = bind.clone();
    }
    if let Some(ref token) = overrides.token {
        config.server.token = Some(token.clone());
    }
    if let Some(seed) = overrides.seed {
        config.analysis.seed = Some(seed);
    }
}

/// File, then process environment, then CLI flags
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut config = load_file(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    apply_cli_overrides(&mut config, overrides);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisMode, CatalogSourceKind, StorageBackend};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(load_file(Some(&temp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(load_file(Some(&path)).is_err());
    }

    #[test]
    fn test_layering_file_env_cli() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 9000\nbind = \"0.0.0.0\"\n[storage]\nbackend = \"file\"\n",
        )
        .unwrap();

        let mut config = load_file(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::File);

        apply_env_overrides(
            &mut config,
            env(&[
                ("MM_PORT", "9100"),
                ("MM_CATALOG_SOURCE", "remote"),
                ("MM_ANALYSIS_MODE", "remote"),
                ("MM_SEED", "11"),
                ("MM_CORS_ORIGINS", "http://a.test, http://b.test"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.catalog.source, CatalogSourceKind::Remote);
        assert_eq!(config.analysis.mode, AnalysisMode::Remote);
        assert_eq!(config.analysis.seed, Some(11));
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);

        apply_cli_overrides(
            &mut config,
            &ConfigOverrides {
                port: Some(9200),
                seed: Some(5),
                ..Default::default()
            },
        );
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.analysis.seed, Some(5));
    }

    #[test]
    fn test_bad_env_value_is_error() {
        let mut config = AppConfig::default();
        assert!(apply_env_overrides(&mut config, env(&[("MM_PORT", "not-a-port")])).is_err());
        assert!(apply_env_overrides(&mut config, env(&[("MM_STORAGE_BACKEND", "s3")])).is_err());
    }
}
