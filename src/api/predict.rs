//! POST /predict: fraud detection inference.
//!
//! Request: transaction features (V1..V28, Amount).
//! Response: fraud_probability, is_fraud.

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{inference, Prediction};
use crate::types::Transaction;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::debug;

/// Run inference on one transaction.
///
/// Validation is strict and happens before the model is consulted: a body
/// that fails to deserialize (missing field, non-numeric value) or carries
/// a negative `Amount` is rejected with 422 regardless of model
/// availability. A missing model yields 503 with the configured model
/// path; anything that fails inside the prediction call yields 422 with
/// the underlying description.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Transaction>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(transaction) =
        payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    transaction.validate().map_err(ApiError::Validation)?;

    let model = state.store.get().ok_or_else(|| ApiError::ModelUnavailable {
        path: state.settings.model_path.clone(),
    })?;

    let prediction = inference::score(&model, &transaction)
        .map_err(|e| ApiError::Inference(e.to_string()))?;

    debug!(
        fraud_probability = prediction.fraud_probability,
        is_fraud = prediction.is_fraud,
        "Prediction served"
    );
    Ok(Json(prediction))
}
