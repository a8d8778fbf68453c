//! Fraud Detection API
//!
//! Serves a trained binary classifier over HTTP for scoring credit card
//! transactions, and provides the offline training utility that produces
//! the serialized model artifact the service loads at startup.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod types;

pub use api::{build_router, AppState};
pub use config::Settings;
pub use error::ApiError;
pub use models::{FraudClassifier, ModelStore, Prediction};
pub use types::Transaction;
