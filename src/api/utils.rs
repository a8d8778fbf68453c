//! Operational utility endpoints

use axum::Json;

/// Health check for load balancers and Kubernetes probes. Returns 200
/// with a JSON `true` regardless of model state.
pub async fn health_check() -> Json<bool> {
    Json(true)
}
