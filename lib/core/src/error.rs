use crate::feature::SnapshotId;
use crate::record::RecordId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot fit a normalizer on an empty record population")]
    EmptyPopulation,

    #[error("record kind '{kind}' is not covered by the fitted population")]
    SchemaMismatch { kind: &'static str },

    #[error("feature vectors belong to different snapshots: expected {expected}, got {actual}")]
    StaleEncoding {
        expected: SnapshotId,
        actual: SnapshotId,
    },

    #[error("invalid weight config: {0}")]
    InvalidWeights(String),

    #[error("requested {requested} neighbors but only {available} candidates are available")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("neighbor count k must be at least 1")]
    ZeroNeighbors,

    #[error("record not found: {0}")]
    UnknownRecord(RecordId),

    #[error("{field} value {value} is outside the declared bounds {min}..={max}")]
    ScoreOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
