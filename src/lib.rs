//! OWID Predictor - COVID-19 Forecast Dashboard Client
//!
//! Client-side tooling for the OWID COVID-19 prediction service:
//! a resilient API client that degrades to built-in catalogs and
//! synthetic forecasts when the backend is unreachable, plus the
//! configuration, connection-monitoring, and display-formatting
//! layers the dashboard builds on.

pub mod api;
pub mod config;
pub mod format;
pub mod progress;

// Re-export commonly used types
pub use api::client::PredictionClient;
pub use api::monitor::ConnectionMonitor;
pub use api::types::{ModelType, PredictionRequest, PredictionResult};
pub use config::{ApiConfig, Environment};
