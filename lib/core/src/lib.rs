//! # reflectx Core
//!
//! Core data model for the reflectx experience-analysis engine.
//!
//! This crate provides the fundamental types shared by the engine:
//!
//! - [`Record`] - One archived experience with scores, tags, and timestamp
//! - [`RecordKind`] - Closed variant (subject, activity, book) with
//!   kind-specific facets
//! - [`FeatureVector`] - Fixed-schema numeric encoding of a record
//! - [`FeatureSchema`] - Component provenance shared by one encoding pass
//! - [`Metric`] - Distance metric strategy (Euclidean by default)
//!
//! ## Example
//!
//! ```rust
//! use reflectx_core::{Record, RecordKind};
//! use chrono::Utc;
//!
//! let record = Record::new(
//!     "graph-theory",
//!     RecordKind::Subject { curiosity: 9.0, closure: 3.0 },
//!     88.0,
//!     95.0,
//!     Utc::now(),
//! )
//! .unwrap()
//! .with_tags(["stem", "math"]);
//!
//! assert_eq!(record.kind().name(), "subject");
//! ```

pub mod error;
pub mod feature;
pub mod record;

pub use error::{Error, Result};
pub use feature::{ComponentSpec, Encoding, FeatureSchema, FeatureVector, Metric, SnapshotId};
pub use record::{Record, RecordId, RecordKind, ScoreBounds, SCALE_PERCENT, SCALE_TEN};
