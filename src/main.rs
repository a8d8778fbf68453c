//! Fraud Detection API - Main Entry Point
//!
//! Loads the serialized classifier at startup, serves predictions over
//! HTTP, and clears the model handle again on shutdown.

use anyhow::{Context, Result};
use fraud_detection_api::models::FraudClassifier;
use fraud_detection_api::{build_router, AppState, ModelStore, Settings};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_detection_api=info".parse()?),
        )
        .init();

    let settings = Settings::load()?;
    info!(
        project = %settings.project_name,
        environment = ?settings.environment,
        prefix = %settings.api_v1_str,
        "Starting fraud detection API"
    );
    if settings.telemetry_enabled() {
        info!("Error telemetry DSN configured");
    }

    // Model lifecycle: load once at startup, or come up without a model so
    // health checks still succeed.
    let store = ModelStore::new();
    let model_path = settings.resolved_model_path()?;
    if model_path.exists() {
        let model = FraudClassifier::load(&model_path)?;
        info!(
            path = %model_path.display(),
            trees = model.n_trees(),
            features = model.n_features(),
            "Model loaded"
        );
        store.set(Some(model));
    } else {
        warn!(
            path = %model_path.display(),
            "Model artifact not found; serving without a model"
        );
        store.set(None);
    }

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(settings, store.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Mirror startup: release the model handle on the way out
    store.set(None);
    info!("Fraud detection API shut down");
    Ok(())
}

/// Resolve on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
