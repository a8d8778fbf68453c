//! Offline training support: dataset loading, synthetic data generation
//! and evaluation.
//!
//! The CSV schema is the Credit Card Fraud dataset (`V1..V28, Amount,
//! Class`). When no CSV is available, synthetic data with the same shape
//! is generated so the pipeline can be exercised end to end.

use crate::models::forest::FraudClassifier;
use crate::types::FEATURE_COLUMNS;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Label column in the training CSV.
pub const TARGET_COLUMN: &str = "Class";

/// Fraud rate of the synthetic data, mirroring the real dataset.
const SYNTHETIC_FRAUD_RATE: f64 = 0.0017;

/// Labeled training data: one feature row per label.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u32>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

/// Load a labeled dataset from a CSV with columns `V1..V28, Amount, Class`.
/// Column order in the file is free; rows are reassembled into training
/// order from the header.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open training data at {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.context("failed to read CSV header")?,
        None => bail!("{} is empty", path.display()),
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect();

    let column_index = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| c == name)
            .with_context(|| format!("CSV must contain column '{}'", name))
    };

    let feature_indices: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .map(|name| column_index(name))
        .collect::<Result<_>>()?;
    let target_index = column_index(TARGET_COLUMN)?;

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let line = line.context("failed to read CSV row")?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(|f| f.trim().trim_matches('"')).collect();

        let mut row = Vec::with_capacity(feature_indices.len());
        for (&idx, name) in feature_indices.iter().zip(FEATURE_COLUMNS.iter()) {
            let raw = fields
                .get(idx)
                .with_context(|| format!("row {} is missing column '{}'", line_no + 2, name))?;
            let value: f64 = raw.parse().with_context(|| {
                format!("row {}: '{}' is not a number for '{}'", line_no + 2, raw, name)
            })?;
            row.push(value);
        }
        let raw_label = fields
            .get(target_index)
            .with_context(|| format!("row {} is missing column '{}'", line_no + 2, TARGET_COLUMN))?;
        // Some exports write the label as 0.0/1.0
        let label = raw_label
            .parse::<f64>()
            .with_context(|| format!("row {}: invalid label '{}'", line_no + 2, raw_label))?
            as u32;

        features.push(row);
        labels.push(label);
    }

    if features.is_empty() {
        bail!("{} contains no data rows", path.display());
    }

    info!(
        rows = features.len(),
        path = %path.display(),
        "Loaded training data"
    );
    Ok(Dataset { features, labels })
}

/// Generate synthetic data with the dataset's shape: standard-normal PCA
/// components, exponentially distributed `Amount` clipped to [0, 25000]
/// and a fraud rate of roughly 0.17%.
pub fn synthetic_dataset(n_samples: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let mut row: Vec<f64> = (0..FEATURE_COLUMNS.len() - 1)
            .map(|_| standard_normal(&mut rng))
            .collect();
        let amount = exponential(&mut rng, 100.0).clamp(0.0, 25_000.0);
        row.push(amount);

        features.push(row);
        labels.push(u32::from(rng.gen::<f64>() < SYNTHETIC_FRAUD_RATE));
    }

    Dataset { features, labels }
}

/// Stratified train/test split: each class is shuffled and divided with
/// the same test fraction so rare fraud labels appear on both sides.
/// Classes too small to split stay in the training set.
pub fn stratified_split(data: &Dataset, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut classes: Vec<u32> = data.labels.clone();
    classes.sort_unstable();
    classes.dedup();

    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();
    for class in classes {
        let mut indices: Vec<usize> = (0..data.len())
            .filter(|&i| data.labels[i] == class)
            .collect();
        indices.shuffle(&mut rng);

        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        if indices.len() < 2 || n_test == 0 {
            train_indices.extend(indices);
            continue;
        }
        let n_test = n_test.min(indices.len() - 1);
        test_indices.extend(indices.drain(..n_test));
        train_indices.extend(indices);
    }

    (data.select(&train_indices), data.select(&test_indices))
}

/// Fraction of rows the model labels correctly.
pub fn accuracy(model: &FraudClassifier, data: &Dataset) -> Result<f64> {
    if data.is_empty() {
        bail!("cannot evaluate on an empty dataset");
    }
    let mut correct = 0usize;
    for (row, &label) in data.features.iter().zip(&data.labels) {
        if model.predict(row)? == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / data.len() as f64)
}

/// Standard normal sample via the Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Exponential sample with the given mean (inverse CDF).
fn exponential(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    -mean * u.ln()
}
