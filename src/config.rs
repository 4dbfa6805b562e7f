use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONFIG_PATH, DEFAULT_DATABASE_PATH, DEFAULT_REQUESTS_PER_MIN,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{CatalogError, Result};
use crate::rate_limiter::Limits;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub import: ImportConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Upper bound on upstream requests per minute; 0 disables throttling
    pub requests_per_min: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            requests_per_min: DEFAULT_REQUESTS_PER_MIN,
        }
    }
}

impl ImportConfig {
    pub fn limits(&self) -> Option<Limits> {
        (self.requests_per_min > 0).then(|| Limits {
            requests_per_min: Some(self.requests_per_min),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is unset
    pub default_filter: String,
    /// Directory for the daily rolling JSON log; console only when unset
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "pokedex=info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, or defaults when it is absent.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.api.base_url.trim().is_empty() {
            return Err(CatalogError::Config("api.base_url must not be empty".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(config.import.requests_per_min, DEFAULT_REQUESTS_PER_MIN);
        assert_eq!(config.storage.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            timeout_seconds = 5

            [import]
            requests_per_min = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_seconds, 5);
        assert!(config.import.limits().is_none());
    }

    #[test]
    fn test_blank_base_url_is_rejected() {
        let err = Config::from_toml("[api]\nbase_url = \"  \"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = Config::load_from("/definitely/not/here/config.toml").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
