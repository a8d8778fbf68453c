//! Transaction data structures for credit card fraud detection

use serde::{Deserialize, Serialize};

/// Feature columns in the exact order used at training time.
///
/// The model is fitted against this ordering (`V1..V28, Amount`); inference
/// must present features in the same order or predictions are silently
/// corrupted.
pub const FEATURE_COLUMNS: [&str; 29] = [
    "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13", "V14",
    "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26", "V27",
    "V28", "Amount",
];

/// A transaction to be scored for fraud risk.
///
/// Schema matches the Credit Card Fraud dataset: 28 anonymized PCA
/// components plus the transaction amount. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// PCA component 1
    #[serde(rename = "V1")]
    pub v1: f64,
    /// PCA component 2
    #[serde(rename = "V2")]
    pub v2: f64,
    /// PCA component 3
    #[serde(rename = "V3")]
    pub v3: f64,
    /// PCA component 4
    #[serde(rename = "V4")]
    pub v4: f64,
    /// PCA component 5
    #[serde(rename = "V5")]
    pub v5: f64,
    /// PCA component 6
    #[serde(rename = "V6")]
    pub v6: f64,
    /// PCA component 7
    #[serde(rename = "V7")]
    pub v7: f64,
    /// PCA component 8
    #[serde(rename = "V8")]
    pub v8: f64,
    /// PCA component 9
    #[serde(rename = "V9")]
    pub v9: f64,
    /// PCA component 10
    #[serde(rename = "V10")]
    pub v10: f64,
    /// PCA component 11
    #[serde(rename = "V11")]
    pub v11: f64,
    /// PCA component 12
    #[serde(rename = "V12")]
    pub v12: f64,
    /// PCA component 13
    #[serde(rename = "V13")]
    pub v13: f64,
    /// PCA component 14
    #[serde(rename = "V14")]
    pub v14: f64,
    /// PCA component 15
    #[serde(rename = "V15")]
    pub v15: f64,
    /// PCA component 16
    #[serde(rename = "V16")]
    pub v16: f64,
    /// PCA component 17
    #[serde(rename = "V17")]
    pub v17: f64,
    /// PCA component 18
    #[serde(rename = "V18")]
    pub v18: f64,
    /// PCA component 19
    #[serde(rename = "V19")]
    pub v19: f64,
    /// PCA component 20
    #[serde(rename = "V20")]
    pub v20: f64,
    /// PCA component 21
    #[serde(rename = "V21")]
    pub v21: f64,
    /// PCA component 22
    #[serde(rename = "V22")]
    pub v22: f64,
    /// PCA component 23
    #[serde(rename = "V23")]
    pub v23: f64,
    /// PCA component 24
    #[serde(rename = "V24")]
    pub v24: f64,
    /// PCA component 25
    #[serde(rename = "V25")]
    pub v25: f64,
    /// PCA component 26
    #[serde(rename = "V26")]
    pub v26: f64,
    /// PCA component 27
    #[serde(rename = "V27")]
    pub v27: f64,
    /// PCA component 28
    #[serde(rename = "V28")]
    pub v28: f64,
    /// Transaction amount, must be non-negative
    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl Transaction {
    /// Field-level validation beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.amount < 0.0 {
            return Err(format!(
                "Amount must be greater than or equal to 0, got {}",
                self.amount
            ));
        }
        Ok(())
    }

    /// Ordered feature vector for the model (`V1..V28, Amount`).
    pub fn to_feature_vector(&self) -> [f64; 29] {
        [
            self.v1, self.v2, self.v3, self.v4, self.v5, self.v6, self.v7, self.v8, self.v9,
            self.v10, self.v11, self.v12, self.v13, self.v14, self.v15, self.v16, self.v17,
            self.v18, self.v19, self.v20, self.v21, self.v22, self.v23, self.v24, self.v25,
            self.v26, self.v27, self.v28, self.amount,
        ]
    }
}
