//! Built-in catalogs and synthetic prediction data.
//!
//! When the backend cannot be reached the client degrades to this module
//! instead of surfacing an error, so the dashboard always has something
//! to render.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use rand::Rng;

use super::types::{
    BatchPrediction, CountryCatalog, CountryEntry, Metrics, ModelCatalog, ModelDescriptor,
    ModelType, PredictionPoint, PredictionRequest, PredictionResult,
};

/// Feature columns the real backend trains on; attached to synthetic
/// results so the metrics panel renders identically.
const FALLBACK_FEATURES: [&str; 4] = [
    "cases_lag_1",
    "cases_lag_7",
    "deaths_lag_1",
    "seasonal_sin",
];

/// Fixed country catalog used when `/countries` is unreachable.
///
/// The selector must never be left empty.
pub fn builtin_countries() -> CountryCatalog {
    let featured = ["Senegal", "France", "Germany"];
    let other = ["United States", "Brazil", "India"];

    CountryCatalog {
        total_countries: featured.len() + other.len(),
        featured_countries: featured
            .iter()
            .map(|name| CountryEntry {
                name: (*name).to_string(),
                has_special_config: true,
            })
            .collect(),
        other_countries: other
            .iter()
            .map(|name| CountryEntry {
                name: (*name).to_string(),
                has_special_config: false,
            })
            .collect(),
    }
}

/// Fixed model catalog used when `/models` is unreachable.
pub fn builtin_models() -> ModelCatalog {
    let mut available_models = BTreeMap::new();

    available_models.insert(
        ModelType::Linear.as_str().to_string(),
        ModelDescriptor {
            name: "Linear Regression".to_string(),
            description: "Simple, fast and interpretable".to_string(),
            best_for: vec!["limited data".to_string(), "linear trends".to_string()],
            complexity: Some("Low".to_string()),
            accuracy: Some("Medium".to_string()),
            speed: Some("Fast".to_string()),
        },
    );
    available_models.insert(
        ModelType::RandomForest.as_str().to_string(),
        ModelDescriptor {
            name: "Random Forest".to_string(),
            description: "Robust ensemble model".to_string(),
            best_for: vec![
                "complex data".to_string(),
                "non-linear relationships".to_string(),
            ],
            complexity: Some("Medium".to_string()),
            accuracy: Some("High".to_string()),
            speed: Some("Medium".to_string()),
        },
    );
    available_models.insert(
        ModelType::GradientBoost.as_str().to_string(),
        ModelDescriptor {
            name: "Gradient Boosting".to_string(),
            description: "Advanced high-precision model".to_string(),
            best_for: vec![
                "precise predictions".to_string(),
                "large datasets".to_string(),
            ],
            complexity: Some("High".to_string()),
            accuracy: Some("Very High".to_string()),
            speed: Some("Slow".to_string()),
        },
    );

    let recommended_by_country = [
        ("Senegal", ModelType::RandomForest),
        ("France", ModelType::GradientBoost),
        ("Germany", ModelType::GradientBoost),
    ]
    .into_iter()
    .map(|(country, model)| (country.to_string(), model.as_str().to_string()))
    .collect();

    ModelCatalog {
        available_models,
        default_model: Some(ModelType::Linear.as_str().to_string()),
        recommended_by_country,
    }
}

/// Generate a plausible prediction for an unreachable backend.
///
/// One forecast entry per horizon day starting tomorrow, each derived
/// from a single random base value in [100, 1100) perturbed by up to
/// ±10% and clamped at zero. Metrics land in the ranges a real training
/// run reports (rmse 45-65, mae 32-47, r2 0.75-0.95).
pub fn synthetic_prediction(request: &PredictionRequest) -> PredictionResult {
    let mut rng = rand::thread_rng();

    let base_value = rng.gen_range(100.0_f64..1100.0);
    let tomorrow = Utc::now().date_naive() + Duration::days(1);

    let predictions = (0..request.horizon_days)
        .map(|day| {
            let variation = (rng.gen::<f64>() - 0.5) * 0.2;
            let value = (base_value * (1.0 + variation)).floor().max(0.0);
            PredictionPoint {
                date: tomorrow + Duration::days(i64::from(day)),
                prediction: value,
            }
        })
        .collect();

    let metrics = Metrics {
        rmse: 45.2 + rng.gen::<f64>() * 20.0,
        mae: 32.1 + rng.gen::<f64>() * 15.0,
        r2_score: 0.75 + rng.gen::<f64>() * 0.2,
    };

    let catalog = builtin_models();
    let model_info = catalog
        .descriptor(request.model)
        .cloned()
        .unwrap_or_else(|| {
            // The built-in catalog covers every ModelType variant.
            ModelDescriptor {
                name: request.model.display_name().to_string(),
                description: String::new(),
                best_for: Vec::new(),
                complexity: None,
                accuracy: None,
                speed: None,
            }
        });

    let country_config = if request.country == "Senegal" {
        "Optimized for developing countries".to_string()
    } else {
        "Default configuration".to_string()
    };

    PredictionResult {
        country: request.country.clone(),
        model_type: request.model,
        horizon_days: request.horizon_days,
        training_samples: 1200,
        test_samples: 300,
        features_used: FALLBACK_FEATURES.iter().map(|f| f.to_string()).collect(),
        metrics,
        predictions,
        model_info,
        country_config,
    }
}

/// Synthesize a batch result covering every featured country.
pub fn synthetic_batch(model: ModelType, horizon_days: u32) -> BatchPrediction {
    let predictions_by_country = builtin_countries()
        .featured_countries
        .into_iter()
        .map(|entry| {
            let request = PredictionRequest::new(entry.name.clone())
                .with_model(model)
                .with_horizon(horizon_days);
            (entry.name, synthetic_prediction(&request))
        })
        .collect();

    BatchPrediction {
        model_type: model,
        horizon_days,
        predictions_by_country,
    }
}
