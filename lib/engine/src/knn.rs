//! k-nearest-neighbor similarity queries.
//!
//! Linear scan with a bounded max-heap, which is exact and O(n log k) —
//! the right trade at the archive's cardinality (dozens to a few hundred
//! rows). Candidates carry a total order (distance ascending, timestamp
//! descending, id ascending), the same tie-break chain the ranking engine
//! uses, so results never depend on store iteration order.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use reflectx_core::{Error, RecordId, Result};

use crate::snapshot::Snapshot;

/// One neighbor of a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborResult {
    pub id: RecordId,
    pub distance: f64,
    /// 1-based position within the returned neighbors.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    distance: OrderedFloat<f64>,
    timestamp: DateTime<Utc>,
    id: RecordId,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Greater means worse: farther, then older, then larger id.
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Snapshot {
    /// The `k` archived records closest to the archived query record,
    /// excluding the query itself.
    ///
    /// The query must be part of this snapshot's population; `k` must
    /// satisfy `0 < k <= len - 1`. Requesting more neighbors than there
    /// are candidates fails with [`Error::InsufficientCandidates`] rather
    /// than silently truncating.
    pub fn neighbors(&self, query: &RecordId, k: usize) -> Result<Vec<NeighborResult>> {
        let query_index = *self
            .by_id
            .get(query)
            .ok_or_else(|| Error::UnknownRecord(query.clone()))?;
        if k == 0 {
            return Err(Error::ZeroNeighbors);
        }
        let available = self.entries.len() - 1;
        if k > available {
            return Err(Error::InsufficientCandidates {
                requested: k,
                available,
            });
        }

        let query_vector = &self.entries[query_index].vector;
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for entry in &self.entries {
            // Self-exclusion is by identity, not value equality.
            if entry.id == *query {
                continue;
            }
            let distance = entry.vector.distance(query_vector, self.metric())?;
            heap.push(Candidate {
                distance: OrderedFloat(distance),
                timestamp: entry.timestamp,
                id: entry.id.clone(),
            });
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| NeighborResult {
                id: candidate.id,
                distance: candidate.distance.into_inner(),
                rank: index + 1,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reflectx_core::{Metric, Record, RecordKind};

    // Two variance-carrying dimensions (achievement, interest); everything
    // else is constant so it contributes nothing to distance.
    fn subject(id: u64, achievement: f64, interest: f64, secs: i64) -> Record {
        Record::new(
            id,
            RecordKind::Subject {
                curiosity: 5.0,
                closure: 5.0,
            },
            achievement,
            interest,
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
        .unwrap()
    }

    fn snapshot(records: &[Record]) -> Snapshot {
        Snapshot::build(records, Metric::Euclidean).unwrap()
    }

    #[test]
    fn test_query_never_its_own_neighbor() {
        let records = vec![
            subject(1, 10.0, 10.0, 100),
            subject(2, 20.0, 20.0, 200),
            subject(3, 80.0, 80.0, 300),
        ];
        let snapshot = snapshot(&records);
        let neighbors = snapshot.neighbors(&RecordId::from(1u64), 2).unwrap();
        assert!(neighbors.iter().all(|n| n.id != RecordId::from(1u64)));
    }

    #[test]
    fn test_returns_exactly_k_with_non_decreasing_distances() {
        let records = vec![
            subject(1, 10.0, 10.0, 100),
            subject(2, 30.0, 30.0, 200),
            subject(3, 50.0, 50.0, 300),
            subject(4, 90.0, 90.0, 400),
            subject(5, 70.0, 70.0, 500),
        ];
        let snapshot = snapshot(&records);
        for k in 1..=4 {
            let neighbors = snapshot.neighbors(&RecordId::from(3u64), k).unwrap();
            assert_eq!(neighbors.len(), k);
            for pair in neighbors.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
            }
            for (index, neighbor) in neighbors.iter().enumerate() {
                assert_eq!(neighbor.rank, index + 1);
            }
        }
    }

    #[test]
    fn test_k_bounds() {
        let records = vec![
            subject(1, 10.0, 10.0, 100),
            subject(2, 20.0, 20.0, 200),
            subject(3, 80.0, 80.0, 300),
        ];
        let snapshot = snapshot(&records);
        let query = RecordId::from(1u64);

        assert!(matches!(
            snapshot.neighbors(&query, 0),
            Err(Error::ZeroNeighbors)
        ));
        // k == population size leaves only len - 1 candidates.
        assert_eq!(
            snapshot.neighbors(&query, 3).unwrap_err(),
            Error::InsufficientCandidates {
                requested: 3,
                available: 2
            }
        );
        assert!(snapshot.neighbors(&query, 2).is_ok());
    }

    #[test]
    fn test_unknown_query_rejected() {
        let records = vec![subject(1, 10.0, 10.0, 100), subject(2, 20.0, 20.0, 200)];
        let snapshot = snapshot(&records);
        let err = snapshot.neighbors(&RecordId::from(9u64), 1).unwrap_err();
        assert_eq!(err, Error::UnknownRecord(RecordId::from(9u64)));
    }

    #[test]
    fn test_equal_distance_tie_breaks_newest_first() {
        // Query at the normalized origin, two candidates at exactly the
        // same distance, one far away.
        let records = vec![
            subject(1, 0.0, 0.0, 100),   // query
            subject(2, 20.0, 0.0, 200),  // distance 0.2, older
            subject(3, 0.0, 20.0, 300),  // distance 0.2, newer
            subject(4, 100.0, 100.0, 400),
        ];
        let snapshot = snapshot(&records);

        let nearest = snapshot.neighbors(&RecordId::from(1u64), 1).unwrap();
        // Equal distances resolve by timestamp descending: record 3 wins.
        assert_eq!(nearest[0].id, RecordId::from(3u64));

        for _ in 0..10 {
            let again = snapshot.neighbors(&RecordId::from(1u64), 1).unwrap();
            assert_eq!(again, nearest);
        }
    }

    #[test]
    fn test_identical_vectors_are_each_others_neighbors() {
        let records = vec![
            subject(1, 50.0, 50.0, 100),
            subject(2, 50.0, 50.0, 200),
            subject(3, 90.0, 10.0, 300),
        ];
        let snapshot = snapshot(&records);

        let neighbors = snapshot.neighbors(&RecordId::from(1u64), 1).unwrap();
        assert_eq!(neighbors[0].id, RecordId::from(2u64));
        assert_eq!(neighbors[0].distance, 0.0);

        let neighbors = snapshot.neighbors(&RecordId::from(2u64), 1).unwrap();
        assert_eq!(neighbors[0].id, RecordId::from(1u64));
    }

    #[test]
    fn test_neighbor_result_serializes_for_presentation() {
        let records = vec![
            subject(1, 10.0, 10.0, 100),
            subject(2, 20.0, 20.0, 200),
            subject(3, 80.0, 80.0, 300),
        ];
        let snapshot = snapshot(&records);
        let neighbors = snapshot.neighbors(&RecordId::from(1u64), 2).unwrap();

        let json = serde_json::to_value(&neighbors).unwrap();
        assert_eq!(json[0]["id"], 2);
        assert_eq!(json[0]["rank"], 1);
        assert!(json[0]["distance"].is_f64());
    }

    #[test]
    fn test_metric_is_configurable() {
        let records = vec![
            subject(1, 0.0, 0.0, 100),
            subject(2, 100.0, 0.0, 200),
            subject(3, 60.0, 60.0, 300),
        ];
        let euclidean = Snapshot::build(&records, Metric::Euclidean).unwrap();
        let manhattan = Snapshot::build(&records, Metric::Manhattan).unwrap();

        // Euclidean: |(1,0)| = 1.0 < |(0.6,0.6)| ≈ 0.849 — record 3 nearer.
        let nearest = euclidean.neighbors(&RecordId::from(1u64), 1).unwrap();
        assert_eq!(nearest[0].id, RecordId::from(3u64));

        // Manhattan: 1.0 < 1.2 — record 2 nearer.
        let nearest = manhattan.neighbors(&RecordId::from(1u64), 1).unwrap();
        assert_eq!(nearest[0].id, RecordId::from(2u64));
    }
}
