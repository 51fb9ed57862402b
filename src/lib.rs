//! # reflectx
//!
//! Feature encoding, weighted ranking, and k-NN similarity search over
//! small personal-experience archives.
//!
//! reflectx turns heterogeneous records — school subjects, extracurricular
//! activities, reading logs — into comparable feature vectors, ranks them
//! by user-adjustable weights, and finds the experiences most similar to a
//! chosen one. It is built for *small data*: a few dozen to a few hundred
//! mixed-type rows that change often, where exact linear-scan answers and
//! deterministic ordering matter more than index throughput.
//!
//! ## Quick Start
//!
//! ```rust
//! use reflectx::prelude::*;
//! use chrono::Utc;
//!
//! let archive = Archive::new();
//! let record = Record::new(
//!     "robotics-club",
//!     RecordKind::Activity { leadership: 8.0, affinity: 6.0, flow: 90.0 },
//!     85.0,
//!     95.0,
//!     Utc::now(),
//! )
//! .unwrap()
//! .with_tags(["team", "stem"]);
//! archive.upsert(record).unwrap();
//!
//! // Populations of one can be fitted and ranked, just not queried for
//! // neighbors (there would be no candidates).
//! let snapshot = archive.refit().unwrap();
//! let ranking = snapshot
//!     .rank(&WeightConfig::new().with("achievement", 1.0))
//!     .unwrap();
//! assert_eq!(ranking[0].id, RecordId::from("robotics-club"));
//! ```
//!
//! ## Crate Structure
//!
//! - [`reflectx_core`](https://docs.rs/reflectx-core) - Records, feature
//!   vectors, distance metrics, error types
//! - [`reflectx_engine`](https://docs.rs/reflectx-engine) - Normalizer,
//!   encoder, snapshot lifecycle, ranking, k-NN, profile, projection
//!
//! The `reflectx` binary wraps the engine with a JSON record adapter and a
//! console presentation; both stand in for the external collaborators
//! (spreadsheet store, dashboard) that own persistence and display.

pub mod adapter;

// Re-export core types
pub use reflectx_core::{
    ComponentSpec, Encoding, Error, FeatureSchema, FeatureVector, Metric, Record, RecordId,
    RecordKind, Result, ScoreBounds, SnapshotId,
};

// Re-export engine
pub use reflectx_engine::{
    Archive, ArchiveProfile, FeatureEncoder, NeighborResult, Normalizer, ProjectedPoint,
    RankedRecord, Snapshot, WeightConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Archive, ArchiveProfile, Error, FeatureVector, Metric, NeighborResult, Normalizer,
        ProjectedPoint, RankedRecord, Record, RecordId, RecordKind, Result, Snapshot,
        WeightConfig,
    };
}
