use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifies one fitted-normalizer generation.
///
/// Every vector encoded in one pass carries the same id; vectors from
/// different generations are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a component was derived from its source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Raw 0/1 indicator (kind membership).
    RawNumeric,
    /// Min-max scaled numeric field.
    NormalizedNumeric,
    /// One-hot indicator over the fitted tag vocabulary.
    OneHotTag,
}

/// Source field and encoding of a single vector component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub encoding: Encoding,
}

impl ComponentSpec {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            encoding,
        }
    }
}

/// Component layout shared by every vector of one encoding pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    components: Vec<ComponentSpec>,
}

impl FeatureSchema {
    #[inline]
    #[must_use]
    pub fn new(components: Vec<ComponentSpec>) -> Self {
        Self { components }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    /// Index of the component named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }
}

/// Distance metric strategy for feature-vector comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Cosine,
}

/// Fixed-schema numeric encoding of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    components: Vec<f64>,
    schema: Arc<FeatureSchema>,
    snapshot: SnapshotId,
}

impl FeatureVector {
    /// Component count must match the schema length.
    #[must_use]
    pub fn new(components: Vec<f64>, schema: Arc<FeatureSchema>, snapshot: SnapshotId) -> Self {
        debug_assert_eq!(components.len(), schema.len());
        Self {
            components,
            schema,
            snapshot,
        }
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &[f64] {
        &self.components
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    /// Component value by schema name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.components[i])
    }

    /// Distance to another vector of the same snapshot.
    ///
    /// Vectors encoded against different fitted normalizers are rejected
    /// with [`Error::StaleEncoding`].
    pub fn distance(&self, other: &FeatureVector, metric: Metric) -> Result<f64> {
        if self.snapshot != other.snapshot {
            return Err(Error::StaleEncoding {
                expected: self.snapshot,
                actual: other.snapshot,
            });
        }
        Ok(match metric {
            Metric::Euclidean => euclidean_distance(&self.components, &other.components),
            Metric::Manhattan => manhattan_distance(&self.components, &other.components),
            Metric::Cosine => cosine_distance(&self.components, &other.components),
        })
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn manhattan_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// `1 - cosine similarity`; a zero-norm operand yields the maximum 1.0.
fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}
