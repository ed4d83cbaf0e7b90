//! Prediction backend API module.
//!
//! Provides the resilient client the dashboard talks to:
//! - Health probing with fail-fast timeouts
//! - Catalog fetching with built-in fallbacks
//! - Predictions with a 503-aware retry ladder and synthetic fallback
//! - Background connection monitoring

pub mod client;
pub mod fallback;
pub mod monitor;
pub mod types;

// Re-exports for convenience
pub use client::PredictionClient;
pub use monitor::ConnectionMonitor;
pub use types::{
    ApiError, BatchPrediction, CleaningLevel, CountryCatalog, CountryEntry, Language, Metrics,
    ModelCatalog, ModelDescriptor, ModelType, PredictionPoint, PredictionRequest, PredictionResult,
};
