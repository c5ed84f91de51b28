//! Read-only registries built once from the loaded artifacts

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::inference::SequenceClassifier;
use crate::models::{normalize_name, Horizon, InvalidHorizon, NeighborhoodRecord};
use crate::types::NUM_FEATURES;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("neighborhood '{0}' not found")]
    NeighborhoodNotFound(String),

    #[error("no model registered for the {0}-day horizon")]
    MissingHorizon(Horizon),

    #[error("model for the {horizon}-day horizon expects {found} steps of {features} features, required {expected} steps of 4")]
    ShapeMismatch {
        horizon: Horizon,
        expected: usize,
        found: usize,
        features: usize,
    },
}

// ============================================================================
// Neighborhoods
// ============================================================================

/// Neighborhood lookup table keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodRegistry {
    records: HashMap<String, NeighborhoodRecord>,
}

impl NeighborhoodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns `false` and keeps the existing row when the
    /// name is already present
    pub fn insert(&mut self, record: NeighborhoodRecord) -> bool {
        if self.records.contains_key(&record.name) {
            return false;
        }
        self.records.insert(record.name.clone(), record);
        true
    }

    pub fn lookup(&self, name: &str) -> Result<&NeighborhoodRecord, RegistryError> {
        let key = normalize_name(name);
        self.records
            .get(&key)
            .ok_or(RegistryError::NeighborhoodNotFound(key))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Horizon models
// ============================================================================

/// A resolved horizon together with its trained model
#[derive(Clone)]
pub struct HorizonModel {
    pub horizon: Horizon,
    pub model: Arc<dyn SequenceClassifier>,
}

impl HorizonModel {
    pub fn sequence_length(&self) -> usize {
        self.horizon.sequence_length()
    }
}

impl std::fmt::Debug for HorizonModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonModel")
            .field("horizon", &self.horizon)
            .field("sequence_length", &self.model.sequence_length())
            .finish()
    }
}

/// One model per horizon; every horizon must be present
#[derive(Debug, Clone)]
pub struct HorizonRegistry {
    models: HashMap<Horizon, HorizonModel>,
}

impl HorizonRegistry {
    pub fn new(
        models: impl IntoIterator<Item = (Horizon, Arc<dyn SequenceClassifier>)>,
    ) -> Result<Self, RegistryError> {
        let mut registered = HashMap::new();
        for (horizon, model) in models {
            if model.sequence_length() != horizon.sequence_length() || model.n_features() != NUM_FEATURES {
                return Err(RegistryError::ShapeMismatch {
                    horizon,
                    expected: horizon.sequence_length(),
                    found: model.sequence_length(),
                    features: model.n_features(),
                });
            }
            registered.insert(horizon, HorizonModel { horizon, model });
        }

        for horizon in Horizon::ALL {
            if !registered.contains_key(&horizon) {
                return Err(RegistryError::MissingHorizon(horizon));
            }
        }

        Ok(Self { models: registered })
    }

    /// Resolve a request horizon identifier to its model
    pub fn resolve(&self, id: &str) -> Result<&HorizonModel, InvalidHorizon> {
        let horizon = Horizon::resolve(id)?;
        Ok(self.get(horizon))
    }

    pub fn get(&self, horizon: Horizon) -> &HorizonModel {
        // construction guarantees every horizon is registered
        &self.models[&horizon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceError, SequenceBatch};
    use serde_json::Map;

    struct FixedModel {
        steps: usize,
    }

    impl SequenceClassifier for FixedModel {
        fn sequence_length(&self) -> usize {
            self.steps
        }

        fn n_features(&self) -> usize {
            4
        }

        fn predict_proba(&self, batch: &SequenceBatch) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![0.5; batch.batch_size()])
        }
    }

    fn models() -> Vec<(Horizon, Arc<dyn SequenceClassifier>)> {
        Horizon::ALL
            .iter()
            .map(|h| {
                let model: Arc<dyn SequenceClassifier> = Arc::new(FixedModel {
                    steps: h.sequence_length(),
                });
                (*h, model)
            })
            .collect()
    }

    #[test]
    fn test_lookup_normalizes_key() {
        let mut registry = NeighborhoodRegistry::new();
        assert!(registry.insert(NeighborhoodRecord::new("Centro", Some(12.5), Map::new())));

        let record = registry.lookup("  centro ").unwrap();
        assert_eq!(record.name, "CENTRO");
        assert_eq!(record.infestation_index, Some(12.5));
        assert_eq!(
            registry.lookup("inexistente").unwrap_err(),
            RegistryError::NeighborhoodNotFound("INEXISTENTE".to_string())
        );
    }

    #[test]
    fn test_duplicate_keeps_first_row() {
        let mut registry = NeighborhoodRegistry::new();
        assert!(registry.insert(NeighborhoodRecord::new("CENTRO", Some(1.0), Map::new())));
        assert!(!registry.insert(NeighborhoodRecord::new("centro", Some(2.0), Map::new())));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("CENTRO").unwrap().infestation_index, Some(1.0));
    }

    #[test]
    fn test_resolve_returns_matching_model() {
        let registry = HorizonRegistry::new(models()).unwrap();
        for (id, steps) in [("1", 8), ("3", 24), ("5", 40)] {
            let resolved = registry.resolve(id).unwrap();
            assert_eq!(resolved.sequence_length(), steps);
            assert_eq!(resolved.model.sequence_length(), steps);
        }
        assert!(registry.resolve("2").is_err());
    }

    #[test]
    fn test_missing_horizon_rejected() {
        let partial: Vec<_> = models().into_iter().take(2).collect();
        assert_eq!(
            HorizonRegistry::new(partial).unwrap_err(),
            RegistryError::MissingHorizon(Horizon::FiveDays)
        );
    }

    #[test]
    fn test_mismatched_sequence_length_rejected() {
        let mut entries = models();
        entries[1].1 = Arc::new(FixedModel { steps: 8 });
        assert!(matches!(
            HorizonRegistry::new(entries),
            Err(RegistryError::ShapeMismatch {
                horizon: Horizon::ThreeDays,
                ..
            })
        ));
    }
}
