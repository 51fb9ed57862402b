//! Distribution and keyword profile of an archive.
//!
//! The descriptive counterpart to ranking and similarity: how the archived
//! experiences distribute over kinds and tags, and which words keep coming
//! back in the free-text reflections. Counts are ordered count-descending
//! with a label tie-break, so the profile is stable across runs.

use ahash::AHashMap;
use serde::Serialize;

use reflectx_core::Record;

/// How many keywords a profile keeps.
pub const DEFAULT_KEYWORD_LIMIT: usize = 30;

/// Common words excluded from the keyword counts.
const STOP_WORDS: &[&str] = &[
    "about", "after", "all", "also", "an", "and", "are", "as", "at", "be", "because", "been",
    "but", "by", "came", "could", "did", "do", "for", "from", "had", "has", "have", "he", "her",
    "his", "how", "if", "in", "into", "is", "it", "its", "just", "more", "most", "much", "my",
    "no", "not", "of", "on", "one", "or", "our", "out", "over", "she", "so", "some", "than",
    "that", "the", "their", "them", "then", "there", "they", "this", "through", "to", "too",
    "up", "very", "was", "we", "were", "what", "when", "which", "while", "will", "with",
    "would", "you", "your",
];

/// Descriptive summary of one record population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveProfile {
    pub total: usize,
    /// Records per kind, count descending.
    pub kind_counts: Vec<(String, usize)>,
    /// Records per tag, count descending.
    pub tag_counts: Vec<(String, usize)>,
    /// Most frequent free-text keywords, count descending.
    pub keywords: Vec<(String, usize)>,
}

impl ArchiveProfile {
    /// Compute the profile of `records` keeping the default keyword limit.
    #[must_use]
    pub fn compute(records: &[Record]) -> Self {
        Self::compute_with_limit(records, DEFAULT_KEYWORD_LIMIT)
    }

    #[must_use]
    pub fn compute_with_limit(records: &[Record], keyword_limit: usize) -> Self {
        let kind_counts = count_sorted(records.iter().map(|r| r.kind().name().to_string()));
        let tag_counts = count_sorted(records.iter().flat_map(|r| r.tags().iter().cloned()));

        let mut keywords = count_sorted(
            records
                .iter()
                .filter_map(|r| r.free_text())
                .flat_map(tokenize)
                .filter(|token| !STOP_WORDS.contains(&token.as_str())),
        );
        keywords.truncate(keyword_limit);

        Self {
            total: records.len(),
            kind_counts,
            tag_counts,
            keywords,
        }
    }
}

/// Lowercase, split on whitespace and punctuation, drop single characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|s| s.len() > 1)
        .collect()
}

fn count_sorted(items: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reflectx_core::RecordKind;

    fn record(id: u64, kind: RecordKind, tags: &[&str], text: &str) -> Record {
        let mut record = Record::new(
            id,
            kind,
            50.0,
            50.0,
            Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap(),
        )
        .unwrap()
        .with_tags(tags.iter().copied());
        if !text.is_empty() {
            record = record.with_free_text(text);
        }
        record
    }

    fn subject() -> RecordKind {
        RecordKind::Subject {
            curiosity: 5.0,
            closure: 5.0,
        }
    }

    fn book() -> RecordKind {
        RecordKind::Book { complexity: 5.0 }
    }

    #[test]
    fn test_kind_and_tag_distribution() {
        let records = vec![
            record(1, subject(), &["stem"], ""),
            record(2, subject(), &["stem", "lab"], ""),
            record(3, book(), &["fiction"], ""),
        ];
        let profile = ArchiveProfile::compute(&records);

        assert_eq!(profile.total, 3);
        assert_eq!(
            profile.kind_counts,
            vec![("subject".to_string(), 2), ("book".to_string(), 1)]
        );
        assert_eq!(
            profile.tag_counts,
            vec![
                ("stem".to_string(), 2),
                ("fiction".to_string(), 1),
                ("lab".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_keywords_filter_stop_words_and_short_tokens() {
        let records = vec![
            record(1, subject(), &[], "debugging the simulation, debugging again"),
            record(2, book(), &[], "a simulation of markets"),
        ];
        let profile = ArchiveProfile::compute(&records);

        assert_eq!(profile.keywords[0], ("debugging".to_string(), 2));
        assert_eq!(profile.keywords[1], ("simulation".to_string(), 2));
        assert!(profile
            .keywords
            .iter()
            .all(|(word, _)| word != "the" && word != "a"));
    }

    #[test]
    fn test_keyword_limit() {
        let text = "alpha beta gamma delta epsilon zeta";
        let records = vec![record(1, subject(), &[], text)];
        let profile = ArchiveProfile::compute_with_limit(&records, 2);
        assert_eq!(profile.keywords.len(), 2);
        // Equal counts fall back to lexicographic order.
        assert_eq!(profile.keywords[0].0, "alpha");
        assert_eq!(profile.keywords[1].0, "beta");
    }

    #[test]
    fn test_profile_is_deterministic() {
        let records = vec![
            record(1, subject(), &["stem", "lab"], "sorting networks"),
            record(2, book(), &["fiction"], "sorting hats"),
        ];
        let first = ArchiveProfile::compute(&records);
        for _ in 0..5 {
            assert_eq!(ArchiveProfile::compute(&records), first);
        }
    }

    #[test]
    fn test_empty_population_profile() {
        let profile = ArchiveProfile::compute(&[]);
        assert_eq!(profile.total, 0);
        assert!(profile.kind_counts.is_empty());
        assert!(profile.keywords.is_empty());
    }
}
