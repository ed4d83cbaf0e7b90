//! Shared API types and error definitions.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for backend API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded its deadline and was aborted
    #[error("Request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("API returned status {0}")]
    Status(u16),

    /// Response body could not be parsed into the expected schema
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// Backend is still initializing (503 with a retry hint)
    #[error("Service warming up - retry after {retry_after_secs}s")]
    Warming {
        /// Server-suggested wait before the next attempt
        retry_after_secs: u64,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether this failure is an expected cold-start symptom.
    ///
    /// Timeouts and warming responses are never surfaced to the
    /// user-visible error channel.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Warming { .. })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedBody(err.to_string())
    }
}

/// Prediction model offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Linear regression
    #[default]
    Linear,
    /// Random forest ensemble
    RandomForest,
    /// Gradient boosting
    GradientBoost,
}

impl ModelType {
    /// Wire name used in query parameters and catalog keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Linear => "linear",
            ModelType::RandomForest => "random_forest",
            ModelType::GradientBoost => "gradient_boost",
        }
    }

    /// Get display name for this model.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Linear => "Linear Regression",
            ModelType::RandomForest => "Random Forest",
            ModelType::GradientBoost => "Gradient Boosting",
        }
    }

    /// All models known to the client, in catalog order.
    pub fn all() -> [ModelType; 3] {
        [
            ModelType::Linear,
            ModelType::RandomForest,
            ModelType::GradientBoost,
        ]
    }
}

impl FromStr for ModelType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ModelType::Linear),
            "random_forest" => Ok(ModelType::RandomForest),
            "gradient_boost" => Ok(ModelType::GradientBoost),
            other => Err(ApiError::Config(format!("unknown model type: {other}"))),
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Backend-side data-cleaning intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningLevel {
    /// Keep raw values, drop only unusable rows
    Minimal,
    /// Balanced outlier handling (default)
    #[default]
    Standard,
    /// Aggressive smoothing and outlier removal
    Strict,
}

impl CleaningLevel {
    /// Wire name used in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningLevel::Minimal => "minimal",
            CleaningLevel::Standard => "standard",
            CleaningLevel::Strict => "strict",
        }
    }
}

impl FromStr for CleaningLevel {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(CleaningLevel::Minimal),
            "standard" => Ok(CleaningLevel::Standard),
            "strict" => Ok(CleaningLevel::Strict),
            other => Err(ApiError::Config(format!("unknown cleaning level: {other}"))),
        }
    }
}

impl std::fmt::Display for CleaningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response language requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default)
    #[default]
    En,
    /// French
    Fr,
}

impl Language {
    /// Wire name sent as the `lang` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for a single prediction request.
///
/// Constructed fresh per submission; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    /// Country to forecast
    pub country: String,
    /// Model to train
    pub model: ModelType,
    /// Days ahead to forecast (the UI offers 7/14/21/30, any positive
    /// value is accepted)
    pub horizon_days: u32,
    /// Preprocessing intensity
    pub cleaning_level: CleaningLevel,
    /// Response language
    pub language: Language,
    /// Dataset override forwarded to the backend
    pub data_path: Option<String>,
}

impl PredictionRequest {
    /// Create a request with the backend's defaults (linear model,
    /// 14-day horizon, standard cleaning).
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            model: ModelType::default(),
            horizon_days: 14,
            cleaning_level: CleaningLevel::default(),
            language: Language::default(),
            data_path: None,
        }
    }

    /// Set the model type.
    pub fn with_model(mut self, model: ModelType) -> Self {
        self.model = model;
        self
    }

    /// Set the forecast horizon in days.
    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    /// Set the cleaning level.
    pub fn with_cleaning_level(mut self, level: CleaningLevel) -> Self {
        self.cleaning_level = level;
        self
    }

    /// Set the response language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// A single forecasted day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Forecast date (ISO-8601)
    pub date: NaiveDate,
    /// Predicted new cases
    pub prediction: f64,
}

/// Model quality metrics reported with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Root mean squared error on the test split
    pub rmse: f64,
    /// Mean absolute error on the test split
    pub mae: f64,
    /// Coefficient of determination, roughly in [0, 1]
    pub r2_score: f64,
}

/// Descriptive metadata for one model in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Human-readable name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Situations the model is suited for
    #[serde(default)]
    pub best_for: Vec<String>,
    /// Relative complexity (catalog versions before 2.0 omit this)
    #[serde(default)]
    pub complexity: Option<String>,
    /// Relative accuracy
    #[serde(default)]
    pub accuracy: Option<String>,
    /// Relative training speed
    #[serde(default)]
    pub speed: Option<String>,
}

/// A complete prediction, real or synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Country that was forecast
    pub country: String,
    /// Model that produced the forecast
    pub model_type: ModelType,
    /// Forecast length in days
    pub horizon_days: u32,
    /// Rows used for training
    pub training_samples: u64,
    /// Rows held out for evaluation
    pub test_samples: u64,
    /// Feature columns fed to the model
    pub features_used: Vec<String>,
    /// Quality metrics
    pub metrics: Metrics,
    /// One entry per forecast day, `horizon_days` long
    pub predictions: Vec<PredictionPoint>,
    /// Catalog entry for the model used
    pub model_info: ModelDescriptor,
    /// Note about the country-specific backend configuration
    #[serde(default)]
    pub country_config: String,
}

/// One country in the selector catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// Display name
    pub name: String,
    /// Whether the backend carries a tuned configuration for it
    pub has_special_config: bool,
}

/// Countries available for prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryCatalog {
    /// Total countries in the dataset
    pub total_countries: usize,
    /// Countries with a tuned backend configuration
    pub featured_countries: Vec<CountryEntry>,
    /// Remaining countries
    pub other_countries: Vec<CountryEntry>,
}

impl CountryCatalog {
    /// Whether the catalog contains any country at all.
    pub fn is_empty(&self) -> bool {
        self.featured_countries.is_empty() && self.other_countries.is_empty()
    }
}

/// Models available for prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Catalog keyed by wire name
    pub available_models: BTreeMap<String, ModelDescriptor>,
    /// Backend default model
    #[serde(default)]
    pub default_model: Option<String>,
    /// Per-country model recommendation
    #[serde(default)]
    pub recommended_by_country: BTreeMap<String, String>,
}

impl ModelCatalog {
    /// Descriptor for a model, if the catalog carries one.
    pub fn descriptor(&self, model: ModelType) -> Option<&ModelDescriptor> {
        self.available_models.get(model.as_str())
    }

    /// Recommended model for a country, if one is configured.
    pub fn recommended_for(&self, country: &str) -> Option<ModelType> {
        self.recommended_by_country
            .get(country)
            .and_then(|key| key.parse().ok())
    }
}

/// Predictions for every configured country in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPrediction {
    /// Model used for all countries
    pub model_type: ModelType,
    /// Forecast length in days
    pub horizon_days: u32,
    /// One result per configured country
    pub predictions_by_country: BTreeMap<String, PredictionResult>,
}

/// 503 body sent while the backend warms up.
#[derive(Debug, Deserialize)]
pub(crate) struct WarmupBody {
    #[serde(default = "WarmupBody::default_retry_after")]
    pub retry_after: u64,
}

impl WarmupBody {
    fn default_retry_after() -> u64 {
        3
    }
}

impl Default for WarmupBody {
    fn default() -> Self {
        Self {
            retry_after: Self::default_retry_after(),
        }
    }
}
