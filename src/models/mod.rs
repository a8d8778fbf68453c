//! Model training, persistence, lifecycle and inference

pub mod forest;
pub mod inference;
pub mod store;
pub mod training;

pub use forest::{FraudClassifier, ModelError, TrainParams};
pub use inference::{score, Prediction, FRAUD_THRESHOLD};
pub use store::ModelStore;
