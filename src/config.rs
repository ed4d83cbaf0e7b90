//! Deployment environment and client configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the backend base URL.
pub const API_URL_VAR: &str = "OWID_API_URL";

/// Environment variable selecting the deployment environment.
pub const ENVIRONMENT_VAR: &str = "OWID_PREDICTOR_ENV";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local backend (default)
    #[default]
    Development,
    /// Staging deployment
    Staging,
    /// Production deployment on Fly.io
    Production,
}

impl Environment {
    /// Detect the environment from `OWID_PREDICTOR_ENV`.
    ///
    /// Unknown or missing values select development, matching the
    /// original dashboard behavior.
    pub fn detect() -> Self {
        std::env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Default backend base URL for this environment.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:5000",
            Environment::Staging => "https://staging.owid-predictor-api.fly.dev",
            Environment::Production => "https://owid-predictor-api.fly.dev",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(ConfigError::ParseError(format!(
                "unknown environment: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Client configuration.
///
/// Timeout defaults encode the backend's cold-start characteristics:
/// the health probe fails fast while `/predict` tolerates a full
/// cluster warm-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL
    pub base_url: String,
    /// Health probe timeout in seconds
    pub health_timeout_secs: u64,
    /// Catalog request timeout in seconds
    pub request_timeout_secs: u64,
    /// Prediction request timeout in seconds
    pub predict_timeout_secs: u64,
    /// Pause before the final generic retry, in seconds
    pub retry_pause_secs: u64,
    /// Connection monitor poll interval in seconds
    pub monitor_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Environment::default().default_base_url().to_string(),
            health_timeout_secs: 5,
            request_timeout_secs: 10,
            predict_timeout_secs: 60,
            retry_pause_secs: 1,
            monitor_interval_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Configuration for a specific environment.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.default_base_url().to_string(),
            ..Default::default()
        }
    }

    /// Configuration from the process environment: `OWID_PREDICTOR_ENV`
    /// selects the environment, `OWID_API_URL` overrides the base URL.
    pub fn from_env() -> Self {
        let mut config = Self::for_environment(Environment::detect());
        if let Ok(url) = std::env::var(API_URL_VAR) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    /// Configuration pointing at an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Health probe timeout.
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Catalog request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Prediction request timeout.
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }

    /// Pause before the final generic retry.
    pub fn retry_pause(&self) -> Duration {
        Duration::from_secs(self.retry_pause_secs)
    }

    /// Connection monitor poll interval.
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

/// Get the configuration directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "providenceit", "OwidPredictor")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from the default path, falling back to the
/// process environment when no file exists.
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &std::path::Path) -> Result<ApiConfig, ConfigError> {
    if !path.exists() {
        return Ok(ApiConfig::from_env());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save configuration to the default path.
pub fn save_config(config: &ApiConfig) -> Result<(), ConfigError> {
    save_config_to(&get_config_path(), config)
}

/// Save configuration to an explicit path.
pub fn save_config_to(path: &std::path::Path, config: &ApiConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
