//! Record-to-vector feature encoding.
//!
//! Converts one [`Record`] into a [`FeatureVector`] against the fitted
//! [`Normalizer`] parameters, so every vector of one pass shares the same
//! component layout and is directly comparable.

use reflectx_core::{Encoding, Error, FeatureVector, Record, Result};

use crate::normalizer::{Normalizer, UNKNOWN_TAG};

/// Encodes records against one fitted normalizer.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    normalizer: &'a Normalizer,
}

impl<'a> FeatureEncoder<'a> {
    #[inline]
    #[must_use]
    pub fn new(normalizer: &'a Normalizer) -> Self {
        Self { normalizer }
    }

    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        self.normalizer
    }

    /// Encode one record.
    ///
    /// The component walk follows the shared schema:
    /// - kind indicators are raw 0/1;
    /// - numeric features are min-max scaled, with facets the record's kind
    ///   does not carry pinned to the 0.5 midpoint;
    /// - tags one-hot over the fitted vocabulary, with any tag unseen at
    ///   fit time lighting the trailing unknown bucket instead of failing.
    ///
    /// A record whose kind was absent from the fitted population cannot be
    /// laid out on this schema and is rejected with
    /// [`Error::SchemaMismatch`].
    pub fn encode(&self, record: &Record) -> Result<FeatureVector> {
        let kind = record.kind().name();
        if !self.normalizer.covers_kind(kind) {
            return Err(Error::SchemaMismatch { kind });
        }

        let schema = self.normalizer.schema();
        let has_unknown_tag = record
            .tags()
            .iter()
            .any(|tag| !self.normalizer.vocabulary().contains(tag));

        let mut components = Vec::with_capacity(schema.len());
        for spec in schema.components() {
            let value = match spec.encoding {
                Encoding::RawNumeric => {
                    let indicator = spec
                        .name
                        .strip_prefix("kind:")
                        .is_some_and(|name| name == kind);
                    if indicator {
                        1.0
                    } else {
                        0.0
                    }
                }
                Encoding::NormalizedNumeric => {
                    let raw = match spec.name.as_str() {
                        "achievement" => Some(record.achievement()),
                        "interest" => Some(record.interest()),
                        facet => record.kind().facet(facet),
                    };
                    match raw {
                        Some(value) => self.normalizer.scale(&spec.name, value),
                        None => 0.5,
                    }
                }
                Encoding::OneHotTag => {
                    if spec.name == UNKNOWN_TAG {
                        if has_unknown_tag {
                            1.0
                        } else {
                            0.0
                        }
                    } else {
                        let hit = spec
                            .name
                            .strip_prefix("tag:")
                            .is_some_and(|tag| record.tags().iter().any(|t| t == tag));
                        if hit {
                            1.0
                        } else {
                            0.0
                        }
                    }
                }
            };
            components.push(value);
        }

        Ok(FeatureVector::new(
            components,
            schema.clone(),
            self.normalizer.id(),
        ))
    }
}
