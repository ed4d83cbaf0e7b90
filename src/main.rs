//! OWID Predictor - COVID-19 Forecast Dashboard Client
//!
//! Command-line entry point: fetches the catalogs, runs one
//! prediction, and prints the metrics and forecast table.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use owid_predictor::api::types::ModelType;
use owid_predictor::config;
use owid_predictor::format::{Formatter, MetricKind};
use owid_predictor::progress::AnalysisStep;
use owid_predictor::{ConnectionMonitor, PredictionClient, PredictionRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OWID Predictor v{}", env!("CARGO_PKG_VERSION"));

    // Usage: owid-predictor [country] [model] [horizon]
    let args: Vec<String> = std::env::args().collect();
    let country = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "Senegal".to_string());
    let model = match args.get(2) {
        Some(arg) => arg.parse()?,
        None => ModelType::RandomForest,
    };
    let horizon: u32 = match args.get(3) {
        Some(arg) => arg.parse()?,
        None => 14,
    };

    let api_config = config::load_config()?;
    tracing::info!("Backend: {}", api_config.base_url);

    let client = Arc::new(PredictionClient::new(api_config));
    let _monitor = ConnectionMonitor::spawn(Arc::clone(&client));

    if !client.check_health().await {
        tracing::warn!("Backend not responding - predictions will use demo data");
    }

    let countries = client.countries().await;
    let models = client.models().await;
    tracing::info!(
        "{} countries and {} models available",
        countries.total_countries,
        models.available_models.len()
    );

    if let Some(recommended) = models.recommended_for(&country) {
        if recommended != model {
            tracing::info!("Recommended model for {country}: {recommended}");
        }
    }

    let request = PredictionRequest::new(&country)
        .with_model(model)
        .with_horizon(horizon);

    // Staged progress, mirroring the dashboard spinner.
    for step in AnalysisStep::all() {
        println!("  {} ...", step.label());
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    let result = client.predict(&request).await;
    let formatter = Formatter::for_language(request.language);

    println!();
    println!(
        "Prediction for {} ({}, {} days)",
        result.country,
        result.model_info.name,
        result.horizon_days
    );
    println!("  {}", result.model_info.description);
    println!("  Country configuration: {}", result.country_config);
    println!(
        "  Training samples: {}   Test samples: {}",
        formatter.metric(result.training_samples as f64, MetricKind::Samples),
        formatter.metric(result.test_samples as f64, MetricKind::Samples),
    );
    println!(
        "  RMSE: {}   MAE: {}   R²: {}",
        formatter.metric(result.metrics.rmse, MetricKind::Rmse),
        formatter.metric(result.metrics.mae, MetricKind::Mae),
        formatter.metric(result.metrics.r2_score, MetricKind::R2Score),
    );
    println!("  Features: {}", result.features_used.join(", "));
    println!();

    for point in &result.predictions {
        println!("  {}  {:>12}", point.date, formatter.number(point.prediction));
    }

    if !client.is_online() {
        println!();
        println!("Note: backend unreachable, these predictions are simulated.");
    }

    Ok(())
}
