use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Inclusive bounds for a scored field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub min: f64,
    pub max: f64,
}

impl ScoreBounds {
    #[inline]
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` is finite and within the bounds.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Ten-point slider scale used by the motive facets.
pub const SCALE_TEN: ScoreBounds = ScoreBounds::new(0.0, 10.0);
/// Percent scale used by the shared scores and flow.
pub const SCALE_PERCENT: ScoreBounds = ScoreBounds::new(0.0, 100.0);

/// Stable record identifier.
///
/// Carries a total order across variants (integers, then strings, then
/// UUIDs) so tie-breaking never depends on the iteration order of the
/// underlying store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    String(String),
    Uuid(Uuid),
    Integer(u64),
}

impl RecordId {
    fn variant_rank(&self) -> u8 {
        match self {
            RecordId::Integer(_) => 0,
            RecordId::String(_) => 1,
            RecordId::Uuid(_) => 2,
        }
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RecordId::Integer(a), RecordId::Integer(b)) => a.cmp(b),
            (RecordId::String(a), RecordId::String(b)) => a.cmp(b),
            (RecordId::Uuid(a), RecordId::Uuid(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::String(s) => write!(f, "{}", s),
            RecordId::Uuid(u) => write!(f, "{}", u),
            RecordId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::String(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(i: u64) -> Self {
        RecordId::Integer(i)
    }
}

impl From<Uuid> for RecordId {
    fn from(u: Uuid) -> Self {
        RecordId::Uuid(u)
    }
}

/// Closed experience variant with its kind-specific numeric facets.
///
/// Subjects carry the curiosity/closure sliders, activities the motive and
/// flow sliders, books the integrative-complexity rating. The facet set is
/// part of the variant, not an open field map, so the encoder can switch on
/// the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordKind {
    Subject { curiosity: f64, closure: f64 },
    Activity { leadership: f64, affinity: f64, flow: f64 },
    Book { complexity: f64 },
}

impl RecordKind {
    /// Tag name of the variant.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Subject { .. } => "subject",
            RecordKind::Activity { .. } => "activity",
            RecordKind::Book { .. } => "book",
        }
    }

    /// Bounds of the shared achievement/interest scores for this kind.
    #[inline]
    #[must_use]
    pub fn score_bounds(&self) -> ScoreBounds {
        SCALE_PERCENT
    }

    /// Kind-specific facets as `(feature name, value, bounds)` triples.
    #[must_use]
    pub fn facets(&self) -> SmallVec<[(&'static str, f64, ScoreBounds); 3]> {
        match self {
            RecordKind::Subject { curiosity, closure } => SmallVec::from_slice(&[
                ("curiosity", *curiosity, SCALE_TEN),
                ("closure", *closure, SCALE_TEN),
            ]),
            RecordKind::Activity {
                leadership,
                affinity,
                flow,
            } => SmallVec::from_slice(&[
                ("leadership", *leadership, SCALE_TEN),
                ("affinity", *affinity, SCALE_TEN),
                ("flow", *flow, SCALE_PERCENT),
            ]),
            RecordKind::Book { complexity } => {
                SmallVec::from_slice(&[("complexity", *complexity, SCALE_TEN)])
            }
        }
    }

    /// Facet value by feature name, if this kind carries it.
    #[must_use]
    pub fn facet(&self, name: &str) -> Option<f64> {
        self.facets()
            .iter()
            .find(|(facet_name, _, _)| *facet_name == name)
            .map(|(_, value, _)| *value)
    }
}

/// One archived experience.
///
/// The kind is fixed at creation; scores are validated against the declared
/// bounds at ingestion. `free_text` never participates in numeric
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    #[serde(flatten)]
    kind: RecordKind,
    achievement: f64,
    interest: f64,
    #[serde(default)]
    tags: SmallVec<[String; 4]>,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    free_text: Option<String>,
}

impl Record {
    /// Create a validated record. Rejects out-of-bounds scores.
    pub fn new(
        id: impl Into<RecordId>,
        kind: RecordKind,
        achievement: f64,
        interest: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let record = Self {
            id: id.into(),
            kind,
            achievement,
            interest,
            tags: SmallVec::new(),
            timestamp,
            free_text: None,
        };
        record.validate()?;
        Ok(record)
    }

    #[inline]
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    /// Check every scored field against its declared bounds.
    pub fn validate(&self) -> Result<()> {
        let bounds = self.kind.score_bounds();
        check_bounds("achievement", self.achievement, bounds)?;
        check_bounds("interest", self.interest, bounds)?;
        for (name, value, facet_bounds) in self.kind.facets() {
            check_bounds(name, value, facet_bounds)?;
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn achievement(&self) -> f64 {
        self.achievement
    }

    #[inline]
    #[must_use]
    pub fn interest(&self) -> f64 {
        self.interest
    }

    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }
}

fn check_bounds(field: &'static str, value: f64, bounds: ScoreBounds) -> Result<()> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(Error::ScoreOutOfRange {
            field,
            value,
            min: bounds.min,
            max: bounds.max,
        })
    }
}
