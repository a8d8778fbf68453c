//! Process-wide model handle shared by all request handlers.
//!
//! The value is written exactly twice, once at startup and once at
//! shutdown; requests only read it. The store is cloned into the
//! application state so handlers and tests receive it by injection rather
//! than through a global.

use crate::models::forest::FraudClassifier;
use std::sync::{Arc, RwLock};

/// Shared handle to the currently loaded classifier, or `None` when no
/// model artifact was found at startup.
#[derive(Clone, Default)]
pub struct ModelStore {
    inner: Arc<RwLock<Option<Arc<FraudClassifier>>>>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a model (or clear it by passing `None`).
    pub fn set(&self, model: Option<FraudClassifier>) {
        if let Ok(mut slot) = self.inner.write() {
            *slot = model.map(Arc::new);
        }
    }

    /// Current model, if one is loaded.
    pub fn get(&self) -> Option<Arc<FraudClassifier>> {
        self.inner.read().ok().and_then(|slot| slot.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::TrainParams;

    fn tiny_model() -> FraudClassifier {
        let x = vec![vec![0.0], vec![1.0], vec![0.1], vec![0.9]];
        let y = vec![0, 1, 0, 1];
        let params = TrainParams {
            n_trees: 3,
            max_depth: 2,
            min_samples_split: 2,
            seed: 1,
        };
        FraudClassifier::fit(&x, &y, vec!["f0".to_string()], params).unwrap()
    }

    #[test]
    fn test_store_starts_empty() {
        let store = ModelStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_set_and_get() {
        let store = ModelStore::new();
        store.set(Some(tiny_model()));
        assert!(store.is_loaded());
        assert_eq!(store.get().unwrap().n_features(), 1);
    }

    #[test]
    fn test_clear_on_shutdown() {
        let store = ModelStore::new();
        store.set(Some(tiny_model()));
        store.set(None);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = ModelStore::new();
        let view = store.clone();
        store.set(Some(tiny_model()));
        assert!(view.is_loaded());
    }
}
