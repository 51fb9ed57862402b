//! # reflectx Engine
//!
//! Normalization, feature encoding, weighted ranking, and k-NN similarity
//! for small personal-experience archives.
//!
//! The engine turns heterogeneous records (subjects, activities, books)
//! into fixed-schema feature vectors, ranks them by a caller-supplied
//! weight configuration, and answers "find experiences like this one"
//! queries — all against one immutable snapshot per session, so results
//! stay consistent while the archive keeps changing underneath.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use reflectx_core::{Record, RecordKind};
//! use reflectx_engine::{Archive, WeightConfig};
//!
//! let archive = Archive::new();
//! for (id, flow, achievement) in [(1u64, 90.0, 85.0), (2, 40.0, 60.0), (3, 75.0, 95.0)] {
//!     let record = Record::new(
//!         id,
//!         RecordKind::Activity { leadership: 5.0, affinity: 5.0, flow },
//!         achievement,
//!         70.0,
//!         Utc::now(),
//!     )
//!     .unwrap();
//!     archive.upsert(record).unwrap();
//! }
//!
//! // Fit once, query many times against the same snapshot.
//! let snapshot = archive.refit().unwrap();
//!
//! let ranking = snapshot
//!     .rank(&WeightConfig::new().with("achievement", 1.0).with("flow", 2.0))
//!     .unwrap();
//! assert_eq!(ranking.len(), 3);
//!
//! let neighbors = snapshot.neighbors(&ranking[0].id, 2).unwrap();
//! assert_eq!(neighbors.len(), 2);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   refit()   ┌────────────┐   encode    ┌──────────────┐
//! │ Archive  │────────────>│ Normalizer │────────────>│  Snapshot    │
//! │ (records)│             │ (fit state)│             │ (vectors)    │
//! └──────────┘             └────────────┘             └──────┬───────┘
//!                                                            │
//!                                       ┌────────────────────┼─────────┐
//!                                       │                    │         │
//!                                 ┌─────▼─────┐       ┌──────▼───┐ ┌───▼────┐
//!                                 │  rank()   │       │neighbors()│ │ map /  │
//!                                 │ (weights) │       │  (k-NN)   │ │profile │
//!                                 └───────────┘       └──────────┘ └────────┘
//! ```

pub mod encoder;
pub mod knn;
pub mod normalizer;
pub mod profile;
pub mod projection;
pub mod rank;
pub mod snapshot;

pub use encoder::FeatureEncoder;
pub use knn::NeighborResult;
pub use normalizer::{Normalizer, NumericRange, UNKNOWN_TAG};
pub use profile::{ArchiveProfile, DEFAULT_KEYWORD_LIMIT};
pub use projection::ProjectedPoint;
pub use rank::{RankedRecord, WeightConfig};
pub use snapshot::{Archive, Snapshot};
