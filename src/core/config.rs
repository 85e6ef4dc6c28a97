use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable that takes precedence over the configured API key.
pub const API_KEY_ENV: &str = "FXCONV_API_KEY";

pub const DEFAULT_BASE_URL: &str = "http://api.exchangeratesapi.io/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_from() -> String {
    "EUR".to_string()
}

fn default_to() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_from")]
    pub default_from: String,
    #[serde(default = "default_to")]
    pub default_to: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key: None,
            provider: ProviderConfig::default(),
            default_from: default_from(),
            default_to: default_to(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default().with_env_overrides());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config = Self::from_yaml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config.with_env_overrides())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = Some(key);
        }
        self
    }

    /// Returns the configured API key or an error explaining how to set one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .with_context(|| {
                format!("No API key configured. Set `api_key` in the config file or {API_KEY_ENV}")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_key: "secret"
provider:
  base_url: "http://example.com/v1"
  timeout_secs: 3
default_from: "GBP"
default_to: "JPY"
"#;

        let config = AppConfig::from_yaml(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.provider.base_url, "http://example.com/v1");
        assert_eq!(config.provider.timeout_secs, 3);
        assert_eq!(config.default_from, "GBP");
        assert_eq!(config.default_to, "JPY");
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_yaml("api_key: \"secret\"\n").unwrap();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.default_from, "EUR");
        assert_eq!(config.default_to, "USD");

        let partial = AppConfig::from_yaml("provider:\n  timeout_secs: 1\n").unwrap();
        assert_eq!(partial.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(partial.provider.timeout_secs, 1);
        assert!(partial.api_key.is_none());

        let empty = AppConfig::from_yaml("").unwrap();
        assert!(empty.api_key.is_none());
    }

    #[test]
    fn test_api_key_override() {
        let config = AppConfig::from_yaml("api_key: \"from-file\"\n").unwrap();
        let overridden = config
            .clone()
            .with_api_key_override(Some("from-env".to_string()));
        assert_eq!(overridden.api_key.as_deref(), Some("from-env"));

        let blank = config.clone().with_api_key_override(Some("  ".to_string()));
        assert_eq!(blank.api_key.as_deref(), Some("from-file"));

        let unset = config.with_api_key_override(None);
        assert_eq!(unset.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_require_api_key() {
        let config = AppConfig::default();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));

        let config = AppConfig {
            api_key: Some(" key ".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "key");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("provider: [not, a, map]").is_err());
    }
}
