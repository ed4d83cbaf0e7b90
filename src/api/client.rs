//! Prediction backend API client.
//!
//! Mediates all network communication with the prediction service and
//! hides backend unavailability from the dashboard: catalog requests
//! degrade to built-in catalogs, prediction requests walk a 503-aware
//! retry ladder and finally degrade to synthetic data. Every public
//! operation resolves; the caller decides what to render from the
//! shared loading/error/online state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::fallback;
use super::types::{
    ApiError, BatchPrediction, CountryCatalog, ModelCatalog, ModelType, PredictionRequest,
    PredictionResult, WarmupBody,
};
use crate::config::ApiConfig;

/// Whether a failed request may populate the user-visible error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorSurface {
    /// Absorb silently (catalog requests with a built-in fallback)
    Silent,
    /// Record non-transient failures for the UI
    Record,
}

/// Client for the prediction backend.
pub struct PredictionClient {
    /// HTTP client
    http: reqwest::Client,
    /// Timeouts and base URL
    config: ApiConfig,
    /// Whether a request is currently in flight
    loading: Arc<AtomicBool>,
    /// Whether the backend answered its last probe
    online: Arc<AtomicBool>,
    /// Last user-visible error, manually clearable
    error: Arc<RwLock<Option<String>>>,
}

impl PredictionClient {
    /// Create a client with the given configuration.
    pub fn new(config: ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            config,
            loading: Arc::new(AtomicBool::new(false)),
            online: Arc::new(AtomicBool::new(true)),
            error: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a client configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    /// Active configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Whether a request is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    /// Whether the backend answered its most recent probe or request.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }

    /// Last recorded user-visible error.
    pub fn last_error(&self) -> Option<String> {
        self.error.try_read().ok()?.clone()
    }

    /// Clear the user-visible error.
    pub fn clear_error(&self) {
        if let Ok(mut error) = self.error.try_write() {
            *error = None;
        }
    }

    /// Probe backend liveness.
    ///
    /// True only on a 2xx response within the health timeout; any
    /// transport error, non-2xx status, or timeout yields false.
    pub async fn check_health(&self) -> bool {
        self.begin_request().await;
        let healthy = self.probe_health().await;
        self.end_request();
        healthy
    }

    /// Fetch the country catalog.
    ///
    /// Never fails and never returns an empty catalog: any error, and
    /// an empty backend response, degrade to the built-in catalog.
    pub async fn countries(&self) -> CountryCatalog {
        self.begin_request().await;

        let catalog = match self
            .get_json::<CountryCatalog>(
                "/countries",
                &[],
                self.config.request_timeout(),
                ErrorSurface::Silent,
            )
            .await
        {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                tracing::warn!("backend returned an empty country catalog, using built-in");
                fallback::builtin_countries()
            }
            Err(err) => {
                tracing::warn!("country catalog request failed: {err}, using built-in");
                fallback::builtin_countries()
            }
        };

        self.end_request();
        catalog
    }

    /// Fetch the model catalog, with the same fallback discipline as
    /// [`Self::countries`].
    pub async fn models(&self) -> ModelCatalog {
        self.begin_request().await;

        let catalog = match self
            .get_json::<ModelCatalog>(
                "/models",
                &[],
                self.config.request_timeout(),
                ErrorSurface::Silent,
            )
            .await
        {
            Ok(catalog) if !catalog.available_models.is_empty() => catalog,
            Ok(_) => {
                tracing::warn!("backend returned an empty model catalog, using built-in");
                fallback::builtin_models()
            }
            Err(err) => {
                tracing::warn!("model catalog request failed: {err}, using built-in");
                fallback::builtin_models()
            }
        };

        self.end_request();
        catalog
    }

    /// Request a forecast.
    ///
    /// Walks the retry ladder (warm-up probe, 503 backoff retry, one
    /// generic retry) and synthesizes a plausible result when every
    /// attempt fails. Always resolves; a caller cannot distinguish
    /// real from synthetic data without inspecting metadata.
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.begin_request().await;

        // Best-effort warm-up signal; the result only paces logging.
        let healthy = self.probe_health().await;
        tracing::debug!(healthy, country = %request.country, "pre-flight health probe");

        let query = predict_query(request);
        let result = match self
            .fetch_with_retry::<PredictionResult>("/predict", &query)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    country = %request.country,
                    model = %request.model,
                    "prediction attempts exhausted ({err}), synthesizing result"
                );
                fallback::synthetic_prediction(request)
            }
        };

        self.end_request();
        result
    }

    /// Request forecasts for every configured country in one call.
    ///
    /// Same retry and fallback discipline as [`Self::predict`].
    pub async fn predict_all(&self, model: ModelType, horizon_days: u32) -> BatchPrediction {
        self.begin_request().await;

        let query = vec![
            ("model", model.to_string()),
            ("horizon", horizon_days.to_string()),
        ];
        let batch = match self
            .fetch_with_retry::<BatchPrediction>("/predict_all", &query)
            .await
        {
            Ok(batch) => batch,
            Err(err) => {
                tracing::warn!("batch prediction attempts exhausted ({err}), synthesizing");
                fallback::synthetic_batch(model, horizon_days)
            }
        };

        self.end_request();
        batch
    }

    /// Health probe without touching the loading flag, used by the
    /// public operation, the pre-flight gate in `predict`, and the
    /// connection monitor.
    pub(crate) async fn probe_health(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self
            .http
            .get(&url)
            .timeout(self.config.health_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                self.set_online(healthy);
                healthy
            }
            Err(err) => {
                tracing::debug!("health check failed: {err}");
                self.set_online(false);
                false
            }
        }
    }

    /// Prediction retry ladder: one attempt, a 503-hinted retry, then
    /// a final retry after a short fixed pause.
    async fn fetch_with_retry<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<R, ApiError> {
        let timeout = self.config.predict_timeout();

        let first = self
            .get_json::<R>(path, query, timeout, ErrorSurface::Record)
            .await;

        let before_final = match first {
            Ok(result) => return Ok(result),
            Err(ApiError::Warming { retry_after_secs }) => {
                tracing::info!(retry_after_secs, "backend warming up, honoring retry hint");
                tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                self.get_json::<R>(path, query, timeout, ErrorSurface::Record)
                    .await
            }
            Err(err) => Err(err),
        };

        match before_final {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::info!("request to {path} failed ({err}), final retry");
                tokio::time::sleep(self.config.retry_pause()).await;
                self.get_json::<R>(path, query, timeout, ErrorSurface::Record)
                    .await
            }
        }
    }

    /// Issue one GET and parse the body at the boundary.
    async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
        surface: ErrorSurface,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);

        let result = self.send_request::<R>(&url, query, timeout).await;

        if let Err(err) = &result {
            // Timeouts and warm-up responses are expected under cold
            // starts and never reach the user-visible channel.
            if surface == ErrorSurface::Record && !err.is_transient() {
                *self.error.write().await = Some(err.to_string());
            }
        }

        result
    }

    async fn send_request<R: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<R, ApiError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    if e.is_connect() {
                        self.set_online(false);
                    }
                    ApiError::Transport(e.to_string())
                }
            })?;

        let status = response.status();

        if status.as_u16() == 503 {
            self.set_online(false);
            let hint = response
                .json::<WarmupBody>()
                .await
                .unwrap_or_default();
            return Err(ApiError::Warming {
                retry_after_secs: hint.retry_after,
            });
        }

        if !status.is_success() {
            if status.is_server_error() {
                self.set_online(false);
            }
            return Err(ApiError::Status(status.as_u16()));
        }

        self.set_online(true);
        response
            .json::<R>()
            .await
            .map_err(|e| ApiError::MalformedBody(e.to_string()))
    }

    /// Reset the per-request state: loading on, error cleared.
    async fn begin_request(&self) {
        self.loading.store(true, Ordering::Relaxed);
        *self.error.write().await = None;
    }

    fn end_request(&self) {
        self.loading.store(false, Ordering::Relaxed);
    }
}

/// Query parameters for a `/predict` call.
fn predict_query(request: &PredictionRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("country", request.country.clone()),
        ("model", request.model.to_string()),
        ("horizon", request.horizon_days.to_string()),
        ("cleaning_level", request.cleaning_level.to_string()),
        ("lang", request.language.to_string()),
    ];
    if let Some(data_path) = &request.data_path {
        query.push(("data_path", data_path.clone()));
    }
    query
}
