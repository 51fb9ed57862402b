//! Weighted composite ranking.
//!
//! A [`WeightConfig`] maps feature names (shared scores, kind facets, or
//! explicit `tag:` dimensions) to non-negative weights. Ranking normalizes
//! the weights internally and scores only the weighted components, so
//! sparse one-hot dimensions never distort the order unless asked for.

use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;

use reflectx_core::{Error, FeatureSchema, RecordId, Result};

use crate::snapshot::Snapshot;

/// Per-feature weighting for the composite score.
///
/// Weights need not sum to one; unknown feature names are ignored when
/// resolving against the schema. A config with any negative weight, or one
/// that resolves to no strictly positive weight, is rejected with
/// [`Error::InvalidWeights`].
#[derive(Debug, Clone, Default)]
pub struct WeightConfig {
    weights: AHashMap<String, f64>,
}

impl WeightConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, feature: impl Into<String>, weight: f64) -> Self {
        self.set(feature, weight);
        self
    }

    pub fn set(&mut self, feature: impl Into<String>, weight: f64) {
        self.weights.insert(feature.into(), weight);
    }

    #[must_use]
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.weights.get(feature).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Resolve feature names against a schema and normalize the surviving
    /// weights to sum to one.
    pub(crate) fn resolve(&self, schema: &FeatureSchema) -> Result<Vec<ResolvedWeight>> {
        for (name, &weight) in &self.weights {
            if weight < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "feature '{name}' has negative weight {weight}"
                )));
            }
        }

        let mut resolved: Vec<ResolvedWeight> = self
            .weights
            .iter()
            .filter(|(_, &weight)| weight > 0.0)
            .filter_map(|(name, &weight)| {
                schema.position(name).map(|index| ResolvedWeight {
                    index,
                    name: name.clone(),
                    weight,
                })
            })
            .collect();

        let total: f64 = resolved.iter().map(|w| w.weight).sum();
        if total <= 0.0 {
            return Err(Error::InvalidWeights(
                "no strictly positive weight resolves against the schema".to_string(),
            ));
        }
        for entry in &mut resolved {
            entry.weight /= total;
        }
        // Stable contribution order for downstream consumers.
        resolved.sort_by(|a, b| a.index.cmp(&b.index));
        Ok(resolved)
    }
}

impl FromIterator<(String, f64)> for WeightConfig {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedWeight {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) weight: f64,
}

/// One entry of a ranking result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    pub id: RecordId,
    pub score: f64,
    /// Weighted per-feature contributions; they sum to the score.
    pub contributions: BTreeMap<String, f64>,
}

impl Snapshot {
    /// Rank the encoded population by weighted composite score.
    ///
    /// Descending score, ties broken by timestamp descending and then by
    /// id, so two runs over the same snapshot and config are identical.
    pub fn rank(&self, weights: &WeightConfig) -> Result<Vec<RankedRecord>> {
        let resolved = weights.resolve(self.schema())?;

        let scored: Vec<(f64, BTreeMap<String, f64>)> = self
            .entries
            .iter()
            .map(|entry| {
                let mut contributions = BTreeMap::new();
                let mut score = 0.0;
                for weight in &resolved {
                    let contribution = weight.weight * entry.vector.components()[weight.index];
                    contributions.insert(weight.name.clone(), contribution);
                    score += contribution;
                }
                (score, contributions)
            })
            .collect();

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            scored[b]
                .0
                .total_cmp(&scored[a].0)
                .then_with(|| self.entries[b].timestamp.cmp(&self.entries[a].timestamp))
                .then_with(|| self.entries[a].id.cmp(&self.entries[b].id))
        });

        Ok(order
            .into_iter()
            .map(|index| RankedRecord {
                id: self.entries[index].id.clone(),
                score: scored[index].0,
                contributions: scored[index].1.clone(),
            })
            .collect())
    }
}
