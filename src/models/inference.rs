//! Single-transaction scoring against a loaded classifier.

use crate::models::forest::{FraudClassifier, ModelError};
use crate::types::Transaction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraud classification threshold. Fixed; the upstream system offers no
/// tuning knob for precision/recall trade-offs.
pub const FRAUD_THRESHOLD: f64 = 0.5;

/// Result of scoring one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of fraud, rounded to 6 decimal digits
    pub fraud_probability: f64,
    /// True when `fraud_probability >= 0.5`
    pub is_fraud: bool,
}

/// Score one transaction.
///
/// Builds the ordered feature vector, reads the fraud-class probability
/// (index 1) from the model's distribution, rounds it to 6 decimal digits
/// and thresholds the rounded value so the returned label always matches
/// the returned probability. A single-entry distribution (model trained on
/// one class) scores as 0.0 rather than erroring.
pub fn score(model: &FraudClassifier, tx: &Transaction) -> Result<Prediction, ModelError> {
    let features = tx.to_feature_vector();
    let proba = model.predict_proba(&features)?;

    let fraud_prob = if proba.len() > 1 { proba[1] } else { 0.0 };
    let fraud_probability = round6(fraud_prob);

    debug!(
        fraud_probability = fraud_probability,
        classes = proba.len(),
        "Scored transaction"
    );

    Ok(Prediction {
        fraud_probability,
        is_fraud: fraud_probability >= FRAUD_THRESHOLD,
    })
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
