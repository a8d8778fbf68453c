//! Offline training utility.
//!
//! Fits a random forest on the Credit Card Fraud dataset (or synthetic
//! data of the same shape when no CSV is available) and serializes the
//! model to the path the service loads at startup.

use anyhow::{Context, Result};
use clap::Parser;
use fraud_detection_api::models::forest::{FraudClassifier, TrainParams};
use fraud_detection_api::models::training::{
    accuracy, load_csv, stratified_split, synthetic_dataset,
};
use fraud_detection_api::types::FEATURE_COLUMNS;
use std::path::PathBuf;
use tracing::{info, warn};

const SPLIT_SEED: u64 = 42;
const TEST_FRACTION: f64 = 0.2;

/// Train the fraud detection model
#[derive(Debug, Parser)]
#[command(name = "train", about = "Train the fraud detection model")]
struct Args {
    /// Path to creditcard.csv (columns V1..V28, Amount, Class)
    #[arg(long, default_value = "data/creditcard.csv")]
    data: PathBuf,

    /// Output path for the serialized model
    #[arg(long, default_value = "app/model/model.bin")]
    output: PathBuf,

    /// Use synthetic data even if the CSV exists
    #[arg(long)]
    synthetic: bool,

    /// Synthetic sample size
    #[arg(long, default_value_t = 5000)]
    n_samples: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_detection_api=info".parse()?)
                .add_directive("train=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let params = TrainParams::default();

    let data = if args.synthetic || !args.data.exists() {
        if !args.synthetic {
            warn!(
                path = %args.data.display(),
                "Data not found; using synthetic data"
            );
        }
        synthetic_dataset(args.n_samples, params.seed)
    } else {
        load_csv(&args.data)?
    };
    info!(rows = data.len(), "Training set assembled");

    let (train, test) = stratified_split(&data, TEST_FRACTION, SPLIT_SEED);
    info!(train = train.len(), test = test.len(), "Stratified split");

    let feature_names = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
    let model = FraudClassifier::fit(&train.features, &train.labels, feature_names, params)?;

    let score = accuracy(&model, &test)?;
    println!("Model accuracy (test): {:.4}", score);

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    model.save(&args.output)?;
    println!("Saved model to {}", args.output.display());
    Ok(())
}
