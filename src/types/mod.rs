//! Shared data types for the fraud detection API

pub mod transaction;

pub use transaction::{Transaction, FEATURE_COLUMNS};
