//! Archive and snapshot lifecycle.
//!
//! An [`Archive`] holds the live record table behind a single-writer,
//! multiple-reader lock. A [`Snapshot`] is one immutable fit of that table:
//! the fitted normalizer plus the whole population encoded against it.
//! Mutating the archive drops its cached snapshot; sessions holding an
//! `Arc<Snapshot>` keep querying the state they fitted, never observing
//! later inserts.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use reflectx_core::{FeatureSchema, FeatureVector, Metric, Record, RecordId, Result, SnapshotId};

use crate::encoder::FeatureEncoder;
use crate::normalizer::Normalizer;

/// One record encoded into a snapshot.
#[derive(Debug, Clone)]
pub(crate) struct EncodedEntry {
    pub(crate) id: RecordId,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) vector: FeatureVector,
}

/// Immutable fit of one record population.
///
/// All ranking and similarity queries run against a snapshot, so a whole
/// session sees one consistent encoding. Entries are held newest-first
/// with an id tie-break, which keeps every downstream ordering independent
/// of store iteration order.
#[derive(Debug, Clone)]
pub struct Snapshot {
    metric: Metric,
    normalizer: Normalizer,
    pub(crate) entries: Vec<EncodedEntry>,
    pub(crate) by_id: AHashMap<RecordId, usize>,
}

impl Snapshot {
    /// Fit a normalizer on `records` and encode the whole population.
    pub fn build(records: &[Record], metric: Metric) -> Result<Self> {
        let normalizer = Normalizer::fit(records)?;
        let encoder = FeatureEncoder::new(&normalizer);

        let mut entries = records
            .iter()
            .map(|record| {
                Ok(EncodedEntry {
                    id: record.id().clone(),
                    timestamp: record.timestamp(),
                    vector: encoder.encode(record)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });

        let by_id = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id.clone(), index))
            .collect();

        Ok(Self {
            metric,
            normalizer,
            entries,
            by_id,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SnapshotId {
        self.normalizer.id()
    }

    #[inline]
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.normalizer.schema()
    }

    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Encoded vector of an archived record.
    #[must_use]
    pub fn vector(&self, id: &RecordId) -> Option<&FeatureVector> {
        self.by_id.get(id).map(|&index| &self.entries[index].vector)
    }

    /// Record ids in snapshot order (newest first).
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Encode an ad-hoc record against this snapshot's fitted parameters.
    pub fn encode(&self, record: &Record) -> Result<FeatureVector> {
        self.normalizer.transform(record)
    }
}

/// Live record table with explicit snapshot lifecycle.
///
/// The in-process stand-in for the external record store: the host inserts,
/// edits, and removes rows here and calls [`Archive::refit`] whenever the
/// population changed. Queries go through the returned snapshot.
#[derive(Debug)]
pub struct Archive {
    metric: Metric,
    records: RwLock<AHashMap<RecordId, Record>>,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl Archive {
    #[must_use]
    pub fn new() -> Self {
        Self::with_metric(Metric::default())
    }

    #[must_use]
    pub fn with_metric(metric: Metric) -> Self {
        Self {
            metric,
            records: RwLock::new(AHashMap::new()),
            current: RwLock::new(None),
        }
    }

    #[inline]
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Insert or update a record. Scores are validated at ingestion; any
    /// mutation invalidates the cached snapshot.
    pub fn upsert(&self, record: Record) -> Result<()> {
        record.validate()?;
        self.records
            .write()
            .insert(record.id().clone(), record);
        self.invalidate();
        Ok(())
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub fn remove(&self, id: &RecordId) -> bool {
        let removed = self.records.write().remove(id).is_some();
        if removed {
            self.invalidate();
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.read().get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All records, newest first with an id tie-break.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let mut rows: Vec<Record> = self.records.read().values().cloned().collect();
        rows.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });
        rows
    }

    /// Fit a fresh snapshot of the current population and cache it.
    ///
    /// This is the explicit invalidation entry point: the host calls it
    /// after inserts, edits, or removals. The engine never refits on its
    /// own.
    pub fn refit(&self) -> Result<Arc<Snapshot>> {
        let rows = self.records();
        let snapshot = Arc::new(Snapshot::build(&rows, self.metric)?);
        *self.current.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Last fitted snapshot, if no mutation happened since.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    fn invalidate(&self) {
        *self.current.write() = None;
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reflectx_core::RecordKind;

    fn activity(id: u64, achievement: f64, secs: i64) -> Record {
        Record::new(
            id,
            RecordKind::Activity {
                leadership: 5.0,
                affinity: 5.0,
                flow: 50.0,
            },
            achievement,
            50.0,
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_mutation_invalidates_cached_snapshot() {
        let archive = Archive::new();
        archive.upsert(activity(1, 40.0, 100)).unwrap();
        archive.upsert(activity(2, 80.0, 200)).unwrap();

        let snapshot = archive.refit().unwrap();
        assert!(archive.current().is_some());
        assert_eq!(snapshot.len(), 2);

        archive.upsert(activity(3, 60.0, 300)).unwrap();
        assert!(archive.current().is_none());
    }

    #[test]
    fn test_stale_snapshot_does_not_observe_inserts() {
        let archive = Archive::new();
        archive.upsert(activity(1, 40.0, 100)).unwrap();
        archive.upsert(activity(2, 80.0, 200)).unwrap();

        let stale = archive.refit().unwrap();
        archive.upsert(activity(3, 99.0, 300)).unwrap();

        assert_eq!(stale.len(), 2);
        assert!(!stale.contains(&RecordId::from(3u64)));

        let fresh = archive.refit().unwrap();
        assert_eq!(fresh.len(), 3);
        assert_ne!(stale.id(), fresh.id());
    }

    #[test]
    fn test_refit_moves_normalization_bounds() {
        let archive = Archive::new();
        archive.upsert(activity(1, 40.0, 100)).unwrap();
        archive.upsert(activity(2, 80.0, 200)).unwrap();

        let before = archive.refit().unwrap();
        let id = RecordId::from(2u64);
        let max_before = before.vector(&id).unwrap().component("achievement");
        assert_eq!(max_before, Some(1.0));

        // A new record above the old max shifts every normalized value.
        archive.upsert(activity(3, 100.0, 300)).unwrap();
        let after = archive.refit().unwrap();
        let shifted = after.vector(&id).unwrap().component("achievement");
        assert_eq!(shifted, Some((80.0 - 40.0) / 60.0));

        // The stale snapshot still reports the old scale.
        assert_eq!(
            before.vector(&id).unwrap().component("achievement"),
            Some(1.0)
        );
    }

    #[test]
    fn test_remove_and_upsert_round_trip() {
        let archive = Archive::new();
        archive.upsert(activity(1, 40.0, 100)).unwrap();
        assert_eq!(archive.len(), 1);

        assert!(archive.remove(&RecordId::from(1u64)));
        assert!(!archive.remove(&RecordId::from(1u64)));
        assert!(archive.is_empty());
        assert!(matches!(
            archive.refit(),
            Err(reflectx_core::Error::EmptyPopulation)
        ));
    }

    #[test]
    fn test_out_of_bounds_record_rejected_at_ingestion() {
        let archive = Archive::new();
        let record = activity(1, 40.0, 100);
        archive.upsert(record).unwrap();

        let bad = Record::new(
            2u64,
            RecordKind::Book { complexity: 20.0 },
            50.0,
            50.0,
            Utc.timestamp_opt(200, 0).unwrap(),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_snapshot_order_is_newest_first() {
        let archive = Archive::new();
        archive.upsert(activity(1, 40.0, 100)).unwrap();
        archive.upsert(activity(2, 80.0, 300)).unwrap();
        archive.upsert(activity(3, 60.0, 200)).unwrap();

        let snapshot = archive.refit().unwrap();
        let ids: Vec<&RecordId> = snapshot.ids().collect();
        assert_eq!(
            ids,
            vec![
                &RecordId::from(2u64),
                &RecordId::from(3u64),
                &RecordId::from(1u64)
            ]
        );
    }
}
