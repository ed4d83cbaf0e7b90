//! Integration tests for the prediction API client.
//!
//! A minimal in-process TCP responder stands in for the Flask backend
//! so the retry ladder, the fallback paths, and the health probe can
//! be exercised end to end without network access.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use owid_predictor::api::types::{ModelType, PredictionRequest};
use owid_predictor::{ApiConfig, PredictionClient};

/// What the mock backend sends for one request.
#[derive(Clone)]
enum MockResponse {
    Body { status: u16, body: String },
    Hang,
}

impl MockResponse {
    fn ok(body: &str) -> Self {
        MockResponse::Body {
            status: 200,
            body: body.to_string(),
        }
    }

    fn status(status: u16, body: &str) -> Self {
        MockResponse::Body {
            status,
            body: body.to_string(),
        }
    }
}

/// Serve canned responses; returns the base URL.
async fn spawn_backend<F>(respond: F) -> String
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(handle_connection(stream, respond));
        }
    });

    format!("http://{addr}")
}

async fn handle_connection<F>(mut stream: TcpStream, respond: Arc<F>)
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        head.extend_from_slice(&chunk[..n]);
        if head.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let request_line = String::from_utf8_lossy(&head);
    let path = request_line
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    // Route on the path only, ignoring query parameters.
    let route = path.split('?').next().unwrap_or("/");

    match respond(route) {
        MockResponse::Body { status, body } => {
            let reason = match status {
                200 => "OK",
                500 => "Internal Server Error",
                503 => "Service Unavailable",
                _ => "Unknown",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        MockResponse::Hang => {
            tokio::time::sleep(Duration::from_secs(600)).await;
        }
    }
}

/// Client with short timeouts so failure paths stay fast.
fn test_client(base_url: String) -> PredictionClient {
    PredictionClient::new(ApiConfig {
        base_url,
        health_timeout_secs: 1,
        request_timeout_secs: 2,
        predict_timeout_secs: 2,
        retry_pause_secs: 0,
        monitor_interval_secs: 30,
    })
}

/// Base URL nothing listens on.
async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

const HEALTHY_BODY: &str = r#"{"status": "healthy", "service": "OWID COVID-19 Prediction API"}"#;

fn real_prediction_body() -> String {
    let tomorrow = Utc::now().date_naive() + ChronoDuration::days(1);
    let points: Vec<String> = (0..7)
        .map(|day| {
            format!(
                r#"{{"date": "{}", "prediction": {}}}"#,
                tomorrow + ChronoDuration::days(day),
                400 + day * 10
            )
        })
        .collect();

    format!(
        r#"{{
            "country": "France",
            "model_type": "gradient_boost",
            "horizon_days": 7,
            "training_samples": 1400,
            "test_samples": 350,
            "features_used": ["cases_lag_1", "cases_lag_7"],
            "metrics": {{"rmse": 12.5, "mae": 9.25, "r2_score": 0.93}},
            "predictions": [{}],
            "model_info": {{
                "name": "Gradient Boosting",
                "description": "Advanced high-precision model",
                "best_for": ["precise predictions"]
            }},
            "country_config": "Default configuration"
        }}"#,
        points.join(",")
    )
}

#[tokio::test]
async fn predict_passes_backend_result_through() {
    let base_url = spawn_backend(|route| match route {
        "/health" => MockResponse::ok(HEALTHY_BODY),
        "/predict" => MockResponse::ok(&real_prediction_body()),
        _ => MockResponse::status(500, "{}"),
    })
    .await;

    let client = test_client(base_url);
    let request = PredictionRequest::new("France")
        .with_model(ModelType::GradientBoost)
        .with_horizon(7);

    let result = client.predict(&request).await;

    assert_eq!(result.country, "France");
    assert_eq!(result.model_type, ModelType::GradientBoost);
    assert_eq!(result.predictions.len(), 7);
    assert_eq!(result.metrics.rmse, 12.5);
    assert!(client.is_online());
    assert!(client.last_error().is_none());
    assert!(!client.is_loading());
}

#[tokio::test]
async fn predict_synthesizes_when_backend_unreachable() {
    let client = test_client(unreachable_base_url().await);
    let tomorrow = Utc::now().date_naive() + ChronoDuration::days(1);

    let request = PredictionRequest::new("Senegal")
        .with_model(ModelType::RandomForest)
        .with_horizon(14);
    let result = client.predict(&request).await;

    assert_eq!(result.country, "Senegal");
    assert_eq!(result.model_type, ModelType::RandomForest);
    assert_eq!(result.horizon_days, 14);
    assert_eq!(result.predictions.len(), 14);
    assert!(result.metrics.r2_score >= 0.0 && result.metrics.r2_score <= 1.0);

    assert_eq!(result.predictions[0].date, tomorrow);
    for pair in result.predictions.windows(2) {
        assert_eq!(pair[1].date - pair[0].date, ChronoDuration::days(1));
    }

    assert!(!client.is_online());
}

#[tokio::test]
async fn predict_honors_warming_retry_hint() {
    let predict_hits: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let hits = Arc::clone(&predict_hits);

    let base_url = spawn_backend(move |route| match route {
        "/health" => MockResponse::ok(HEALTHY_BODY),
        "/predict" => {
            hits.lock().unwrap().push(Instant::now());
            MockResponse::status(503, r#"{"retry_after": 1}"#)
        }
        _ => MockResponse::status(500, "{}"),
    })
    .await;

    let client = test_client(base_url);
    let request = PredictionRequest::new("Senegal")
        .with_model(ModelType::RandomForest)
        .with_horizon(14);

    let result = client.predict(&request).await;

    // Warm-up hint honored: the second attempt waits at least the
    // server-suggested second.
    let hits = predict_hits.lock().unwrap();
    assert!(hits.len() >= 2, "expected a retry after 503, got {} attempts", hits.len());
    assert!(hits[1] - hits[0] >= Duration::from_secs(1));

    // Retries exhausted: synthetic result tagged with the request.
    assert_eq!(result.country, "Senegal");
    assert_eq!(result.model_type, ModelType::RandomForest);
    assert_eq!(result.predictions.len(), 14);

    // Warm-up responses are expected, never user-visible errors.
    assert!(client.last_error().is_none());
}

#[tokio::test]
async fn predict_absorbs_timeouts_silently() {
    let base_url = spawn_backend(|route| match route {
        "/health" => MockResponse::ok(HEALTHY_BODY),
        _ => MockResponse::Hang,
    })
    .await;

    let client = test_client(base_url);
    let started = Instant::now();
    let result = client.predict(&PredictionRequest::new("Brazil").with_horizon(7)).await;

    assert_eq!(result.predictions.len(), 7);
    assert!(client.last_error().is_none());
    // Two attempts at the 2s predict timeout plus slack.
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn predict_records_server_errors_but_still_resolves() {
    let base_url = spawn_backend(|route| match route {
        "/health" => MockResponse::ok(HEALTHY_BODY),
        "/predict" => MockResponse::status(500, r#"{"error": "boom"}"#),
        _ => MockResponse::status(500, "{}"),
    })
    .await;

    let client = test_client(base_url);
    let result = client.predict(&PredictionRequest::new("India").with_horizon(7)).await;

    assert_eq!(result.predictions.len(), 7);
    assert_eq!(
        client.last_error().as_deref(),
        Some("API returned status 500")
    );

    client.clear_error();
    assert!(client.last_error().is_none());
}

#[tokio::test]
async fn predict_synthesizes_every_ui_horizon() {
    let client = test_client(unreachable_base_url().await);

    for horizon in [7u32, 14, 21, 30] {
        let request = PredictionRequest::new("Germany").with_horizon(horizon);
        let result = client.predict(&request).await;
        assert_eq!(result.predictions.len(), horizon as usize);
        assert_eq!(result.horizon_days, horizon);
    }
}

#[tokio::test]
async fn catalogs_fall_back_when_backend_unreachable() {
    let client = test_client(unreachable_base_url().await);

    let countries = client.countries().await;
    assert!(!countries.is_empty());
    assert_eq!(countries.featured_countries.len(), 3);
    assert!(countries
        .featured_countries
        .iter()
        .any(|c| c.name == "Senegal" && c.has_special_config));

    let models = client.models().await;
    assert_eq!(models.available_models.len(), 3);
    assert_eq!(
        models.recommended_for("Senegal"),
        Some(ModelType::RandomForest)
    );

    // Catalog failures are absorbed silently.
    assert!(client.last_error().is_none());
}

#[tokio::test]
async fn catalogs_fall_back_on_malformed_body() {
    let base_url = spawn_backend(|_| MockResponse::ok("surprise, not json")).await;
    let client = test_client(base_url);

    let countries = client.countries().await;
    assert!(!countries.is_empty());

    let models = client.models().await;
    assert!(!models.available_models.is_empty());
}

#[tokio::test]
async fn catalogs_pass_backend_data_through() {
    let base_url = spawn_backend(|route| match route {
        "/countries" => MockResponse::ok(
            r#"{
                "total_countries": 2,
                "featured_countries": [{"name": "Kenya", "has_special_config": true}],
                "other_countries": [{"name": "Chile", "has_special_config": false}]
            }"#,
        ),
        _ => MockResponse::status(500, "{}"),
    })
    .await;

    let client = test_client(base_url);
    let countries = client.countries().await;

    assert_eq!(countries.total_countries, 2);
    assert_eq!(countries.featured_countries[0].name, "Kenya");
}

#[tokio::test]
async fn health_probe_semantics() {
    let healthy_url = spawn_backend(|route| match route {
        "/health" => MockResponse::ok(HEALTHY_BODY),
        _ => MockResponse::status(500, "{}"),
    })
    .await;
    let client = test_client(healthy_url);
    assert!(client.check_health().await);
    assert!(client.is_online());

    let failing_url = spawn_backend(|_| MockResponse::status(500, "{}")).await;
    let client = test_client(failing_url);
    assert!(!client.check_health().await);
    assert!(!client.is_online());
}

#[tokio::test]
async fn health_probe_times_out_on_hang() {
    let base_url = spawn_backend(|_| MockResponse::Hang).await;
    let client = test_client(base_url);

    let started = Instant::now();
    assert!(!client.check_health().await);
    // Bounded by the 1s health timeout, with slack.
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!client.is_online());
}

#[tokio::test]
async fn predict_all_synthesizes_for_featured_countries() {
    let client = test_client(unreachable_base_url().await);

    let batch = client.predict_all(ModelType::Linear, 7).await;

    assert_eq!(batch.model_type, ModelType::Linear);
    assert_eq!(batch.predictions_by_country.len(), 3);
    assert!(batch.predictions_by_country.contains_key("Senegal"));
    for result in batch.predictions_by_country.values() {
        assert_eq!(result.predictions.len(), 7);
    }
}
