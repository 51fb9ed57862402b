//! Population-derived scaling parameters.
//!
//! A [`Normalizer`] is fitted from one snapshot of the record population and
//! holds everything a consistent encoding pass needs: per-feature min/max
//! ranges, the sorted tag vocabulary, the set of observed record kinds, and
//! the shared component schema. Refitting after the population changes is
//! the caller's responsibility; nothing here refits implicitly.

use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use reflectx_core::{
    ComponentSpec, Encoding, Error, FeatureSchema, FeatureVector, Record, Result, SnapshotId,
};

use crate::encoder::FeatureEncoder;

/// Schema name of the one-hot bucket that absorbs tags unseen at fit time.
pub const UNKNOWN_TAG: &str = "tag:?";

/// Fitted min/max range of one numeric feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Min-max scale into `[0, 1]`.
    ///
    /// A constant field (`min == max`) pins to the 0.5 midpoint instead of
    /// dividing by zero; values outside the fitted range clamp to the unit
    /// interval.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= f64::EPSILON {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        }
    }
}

/// Scaling parameters derived from one population snapshot.
#[derive(Debug, Clone)]
pub struct Normalizer {
    id: SnapshotId,
    kinds: Vec<&'static str>,
    ranges: AHashMap<&'static str, NumericRange>,
    vocabulary: Vec<String>,
    schema: Arc<FeatureSchema>,
}

impl Normalizer {
    /// Fit scaling parameters from the full current record population.
    ///
    /// Fails with [`Error::EmptyPopulation`] on zero records. Each fit gets
    /// a fresh [`SnapshotId`]; vectors encoded against different fits never
    /// compare.
    pub fn fit(records: &[Record]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyPopulation);
        }

        let mut kinds: BTreeSet<&'static str> = BTreeSet::new();
        let mut ranges: BTreeMap<&'static str, NumericRange> = BTreeMap::new();
        let mut vocabulary: BTreeSet<String> = BTreeSet::new();

        for record in records {
            kinds.insert(record.kind().name());
            ranges
                .entry("achievement")
                .or_insert_with(NumericRange::empty)
                .observe(record.achievement());
            ranges
                .entry("interest")
                .or_insert_with(NumericRange::empty)
                .observe(record.interest());
            for (name, value, _) in record.kind().facets() {
                ranges
                    .entry(name)
                    .or_insert_with(NumericRange::empty)
                    .observe(value);
            }
            for tag in record.tags() {
                vocabulary.insert(tag.clone());
            }
        }

        // Deterministic layout: kind indicators, numeric features, then the
        // tag vocabulary with its trailing unknown bucket. All blocks sorted.
        let mut components = Vec::new();
        for kind in &kinds {
            components.push(ComponentSpec::new(format!("kind:{kind}"), Encoding::RawNumeric));
        }
        for name in ranges.keys() {
            components.push(ComponentSpec::new(*name, Encoding::NormalizedNumeric));
        }
        for tag in &vocabulary {
            components.push(ComponentSpec::new(format!("tag:{tag}"), Encoding::OneHotTag));
        }
        components.push(ComponentSpec::new(UNKNOWN_TAG, Encoding::OneHotTag));

        Ok(Self {
            id: SnapshotId::new(),
            kinds: kinds.into_iter().collect(),
            ranges: ranges.into_iter().collect(),
            vocabulary: vocabulary.into_iter().collect(),
            schema: Arc::new(FeatureSchema::new(components)),
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    #[inline]
    #[must_use]
    pub fn kinds(&self) -> &[&'static str] {
        &self.kinds
    }

    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn covers_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| *k == kind)
    }

    /// Fitted range of one numeric feature.
    #[must_use]
    pub fn range(&self, feature: &str) -> Option<NumericRange> {
        self.ranges.get(feature).copied()
    }

    /// Scale one numeric field with the stored parameters.
    ///
    /// Features without a fitted range scale to the 0.5 midpoint, matching
    /// the missing-field substitution policy.
    #[must_use]
    pub fn scale(&self, feature: &str, value: f64) -> f64 {
        self.ranges
            .get(feature)
            .map(|range| range.normalize(value))
            .unwrap_or(0.5)
    }

    /// Apply the stored parameters to one record without mutating them.
    pub fn transform(&self, record: &Record) -> Result<FeatureVector> {
        FeatureEncoder::new(self).encode(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reflectx_core::RecordKind;

    fn subject(id: u64, achievement: f64, interest: f64) -> Record {
        Record::new(
            id,
            RecordKind::Subject {
                curiosity: 5.0,
                closure: 5.0,
            },
            achievement,
            interest,
            Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_rejects_empty_population() {
        assert!(matches!(Normalizer::fit(&[]), Err(Error::EmptyPopulation)));
    }

    #[test]
    fn test_min_max_scaling() {
        let records = vec![subject(1, 40.0, 10.0), subject(2, 80.0, 90.0)];
        let normalizer = Normalizer::fit(&records).unwrap();

        assert_eq!(normalizer.scale("achievement", 40.0), 0.0);
        assert_eq!(normalizer.scale("achievement", 80.0), 1.0);
        assert_eq!(normalizer.scale("achievement", 60.0), 0.5);
        // Out-of-range values clamp rather than leaving the unit interval.
        assert_eq!(normalizer.scale("achievement", 100.0), 1.0);
    }

    #[test]
    fn test_constant_field_pins_to_midpoint() {
        let records = vec![subject(1, 70.0, 10.0), subject(2, 70.0, 90.0)];
        let normalizer = Normalizer::fit(&records).unwrap();
        assert_eq!(normalizer.scale("achievement", 70.0), 0.5);
    }

    #[test]
    fn test_schema_layout_is_sorted_and_stable() {
        let records = vec![
            subject(1, 40.0, 10.0).with_tags(["zeta", "alpha"]),
            subject(2, 80.0, 90.0).with_tags(["mid"]),
        ];
        let normalizer = Normalizer::fit(&records).unwrap();
        let names: Vec<&str> = normalizer
            .schema()
            .components()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "kind:subject",
                "achievement",
                "closure",
                "curiosity",
                "interest",
                "tag:alpha",
                "tag:mid",
                "tag:zeta",
                "tag:?",
            ]
        );
    }

    #[test]
    fn test_each_fit_gets_fresh_snapshot_id() {
        let records = vec![subject(1, 40.0, 10.0)];
        let first = Normalizer::fit(&records).unwrap();
        let second = Normalizer::fit(&records).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_unfitted_feature_scales_to_midpoint() {
        let records = vec![subject(1, 40.0, 10.0)];
        let normalizer = Normalizer::fit(&records).unwrap();
        assert_eq!(normalizer.scale("flow", 55.0), 0.5);
    }
}
