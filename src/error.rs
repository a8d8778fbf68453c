//! API error taxonomy and HTTP mapping.
//!
//! Three mutually exclusive error kinds, each independently
//! distinguishable by clients: validation failures and inference failures
//! map to 422, a missing model maps to 503. None of them is fatal to the
//! process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or out-of-range request fields; detected before
    /// the model is consulted
    #[error("{0}")]
    Validation(String),

    /// No model loaded; the message carries the configured path so an
    /// operator can fix the deployment
    #[error("Model not loaded. Ensure model exists at {path}")]
    ModelUnavailable { path: String },

    /// Any failure during feature assembly or the prediction call
    #[error("Inference error: {0}")]
    Inference(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("bad field".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Inference("shape mismatch".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ModelUnavailable {
                path: "app/model/model.bin".into()
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_model_unavailable_message_contains_path() {
        let err = ApiError::ModelUnavailable {
            path: "/opt/models/model.bin".into(),
        };
        assert!(err.to_string().contains("/opt/models/model.bin"));
    }
}
