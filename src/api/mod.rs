//! HTTP surface: router, shared state and middleware

pub mod predict;
pub mod utils;

use crate::config::Settings;
use crate::models::ModelStore;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// State injected into every handler: settings plus the shared model
/// handle.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: ModelStore,
}

impl AppState {
    pub fn new(settings: Settings, store: ModelStore) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }
}

/// Build the application router with the versioned API nested under the
/// configured prefix.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/predict", post(predict::predict))
        .route("/utils/health-check/", get(utils::health_check));

    let mut router = Router::new()
        .nest(&state.settings.api_v1_str, api_routes)
        .layer(TraceLayer::new_for_http());

    let origins: Vec<HeaderValue> = state
        .settings
        .all_cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();
    if !origins.is_empty() {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        );
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FraudClassifier, TrainParams};
    use crate::types::FEATURE_COLUMNS;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tower::ServiceExt;

    fn trained_model() -> FraudClassifier {
        let mut rng = StdRng::seed_from_u64(5);
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..200 {
            let label = (i % 2) as u32;
            let mut row: Vec<f64> = (0..29).map(|_| rng.gen_range(-1.0..1.0)).collect();
            row[0] = if label == 1 { 2.0 } else { -2.0 };
            x.push(row);
            y.push(label);
        }
        let names = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        let params = TrainParams {
            n_trees: 10,
            max_depth: 4,
            min_samples_split: 2,
            seed: 42,
        };
        FraudClassifier::fit(&x, &y, names, params).unwrap()
    }

    fn app(model: Option<FraudClassifier>) -> Router {
        let store = ModelStore::new();
        store.set(model);
        build_router(AppState::new(Settings::default(), store))
    }

    fn fixture_body(amount: f64) -> String {
        serde_json::json!({
            "V1": -1.0, "V2": 0.5, "V3": -0.2, "V4": 0.1, "V5": -0.5,
            "V6": 0.3, "V7": 0.0, "V8": -0.1, "V9": 0.2, "V10": -0.3,
            "V11": 0.1, "V12": 0.0, "V13": -0.2, "V14": 0.1, "V15": 0.0,
            "V16": -0.1, "V17": 0.0, "V18": 0.1, "V19": -0.1, "V20": 0.0,
            "V21": 0.0, "V22": 0.0, "V23": 0.0, "V24": 0.0, "V25": 0.0,
            "V26": 0.0, "V27": 0.0, "V28": 0.0, "Amount": amount,
        })
        .to_string()
    }

    fn predict_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn predict_returns_probability_and_label() {
        let app = app(Some(trained_model()));

        let response = app.oneshot(predict_request(fixture_body(10.0))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let probability = body["fraud_probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&probability));
        let is_fraud = body["is_fraud"].as_bool().unwrap();
        assert_eq!(is_fraud, probability >= 0.5);
    }

    #[tokio::test]
    async fn predict_is_deterministic_for_identical_input() {
        let app = app(Some(trained_model()));

        let first = app
            .clone()
            .oneshot(predict_request(fixture_body(10.0)))
            .await
            .unwrap();
        let second = app.oneshot(predict_request(fixture_body(10.0))).await.unwrap();

        let a = to_bytes(first.into_body(), usize::MAX).await.unwrap();
        let b = to_bytes(second.into_body(), usize::MAX).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn predict_rejects_negative_amount_without_consulting_model() {
        // Empty store: if validation did not come first, this would be 503
        let app = app(None);

        let response = app.oneshot(predict_request(fixture_body(-1.0))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().contains("Amount"));
    }

    #[tokio::test]
    async fn predict_rejects_missing_field() {
        let app = app(Some(trained_model()));

        let response = app
            .oneshot(predict_request(r#"{"V1": 0.1, "Amount": 10.0}"#.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn predict_without_model_returns_503_with_path() {
        let app = app(None);

        let response = app.oneshot(predict_request(fixture_body(10.0))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .contains("app/model/model.bin"));
    }

    #[tokio::test]
    async fn health_check_is_independent_of_model_state() {
        for model in [None, Some(trained_model())] {
            let app = app(model);
            let response = app
                .oneshot(
                    Request::builder()
                        .method("GET")
                        .uri("/api/v1/utils/health-check/")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], b"true");
        }
    }

    #[tokio::test]
    async fn router_honors_configured_prefix() {
        let settings = Settings {
            api_v1_str: "/api/v2".to_string(),
            ..Settings::default()
        };
        let store = ModelStore::new();
        let app = build_router(AppState::new(settings, store));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v2/utils/health-check/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
