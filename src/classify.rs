//! Keyword-driven category assignment.
//!
//! The keyword table comes from the `keywords` section of the config file:
//!
//! ```yaml
//! keywords:
//!   course: ["tutorial", "course", "lesson"]
//!   case: ["case study", "example"]
//!   trend: ["release", "announces"]
//! ```
//!
//! Key order is significant. Keys are scanned in document order and, within a
//! key, keywords in list order; the first keyword found anywhere in the
//! lower-cased `title + " " + summary` decides the label. A text matching both
//! `course` and `case` keywords is therefore always a course when `course` is
//! listed first, whatever order the words appear in the text.

use crate::models::Category;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// One category key and its trigger words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub key: String,
    pub keywords: Vec<String>,
}

/// Ordered category-to-keywords table.
///
/// Backed by a `Vec` so that the scan order is exactly the order the keys
/// were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    pub fn new<K, W>(entries: impl IntoIterator<Item = (K, Vec<W>)>) -> Self
    where
        K: Into<String>,
        W: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, words)| KeywordEntry {
                    key: key.into(),
                    keywords: words.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }
}

impl<'de> Deserialize<'de> for KeywordTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = KeywordTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of category key to a list of keywords")
            }

            fn visit_unit<E>(self) -> Result<KeywordTable, E>
            where
                E: serde::de::Error,
            {
                Ok(KeywordTable::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<KeywordTable, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((key, keywords)) = map.next_entry::<String, Option<Vec<String>>>()? {
                    entries.push((key, keywords.unwrap_or_default()));
                }
                Ok(KeywordTable::new(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Assign exactly one category to an item.
///
/// Matching is case-insensitive substring containment, so `"tutorial"` also
/// matches `"tutorials"`. Keys without a known label are skipped. No match
/// yields [`Category::TrendingNews`].
pub fn classify(title: &str, summary: &str, table: &KeywordTable) -> Category {
    let combined = format!("{title} {summary}").to_lowercase();

    for entry in table.entries() {
        let Some(category) = Category::from_key(&entry.key) else {
            continue;
        };
        let hit = entry
            .keywords
            .iter()
            .map(|word| word.to_lowercase())
            .any(|word| combined.contains(&word));
        if hit {
            return category;
        }
    }

    Category::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> KeywordTable {
        KeywordTable::new([
            ("course", vec!["tutorial", "Course"]),
            ("case", vec!["example", "case study"]),
            ("trend", vec!["release"]),
        ])
    }

    #[test]
    fn test_key_order_wins_over_text_order() {
        let table = KeywordTable::new([("course", vec!["tutorial"]), ("case", vec!["example"])]);
        assert_eq!(
            classify("A real-world example tutorial", "", &table),
            Category::Course
        );

        let reversed = KeywordTable::new([("case", vec!["example"]), ("course", vec!["tutorial"])]);
        assert_eq!(
            classify("A real-world example tutorial", "", &reversed),
            Category::CaseStudy
        );
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        assert_eq!(classify("TUTORIALS for all", "", &table()), Category::Course);
        assert_eq!(classify("New online course", "", &table()), Category::Course);
        assert_eq!(classify("", "A Case Study in scaling", &table()), Category::CaseStudy);
    }

    #[test]
    fn test_summary_is_searched() {
        assert_eq!(classify("Weekly digest", "model release notes", &table()), Category::TrendingNews);
        assert_eq!(classify("Weekly digest", "worked example inside", &table()), Category::CaseStudy);
    }

    #[test]
    fn test_keyword_spanning_title_and_summary_boundary() {
        let table = KeywordTable::new([("case", vec!["study guide"])]);
        assert_eq!(classify("A study", "guide", &table), Category::CaseStudy);
        assert_eq!(classify("A study", "", &table), Category::TrendingNews);
    }

    #[test]
    fn test_no_match_is_default() {
        assert_eq!(classify("Nothing relevant", "at all", &table()), Category::TrendingNews);
        assert_eq!(classify("", "", &KeywordTable::default()), Category::TrendingNews);
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let table = KeywordTable::new([("news", vec!["model"]), ("case", vec!["model"])]);
        assert_eq!(classify("A model", "", &table), Category::CaseStudy);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let table = table();
        let first = classify("Example tutorial release", "summary", &table);
        for _ in 0..50 {
            assert_eq!(classify("Example tutorial release", "summary", &table), first);
        }
    }

    #[test]
    fn test_deserialize_preserves_document_order() {
        let yaml = "case: [example]\ntrend: [release]\ncourse: [tutorial]\nempty:\n";
        let table: KeywordTable = serde_yaml::from_str(yaml).unwrap();
        let keys: Vec<_> = table.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["case", "trend", "course", "empty"]);
        assert!(table.entries()[3].keywords.is_empty());

        assert_eq!(classify("example tutorial", "", &table), Category::CaseStudy);
    }

    #[test]
    fn test_deserialized_table_matches_constructed_table() {
        let yaml = "course: [tutorial, Course]\ncase: [example, case study]\ntrend: [release]\n";
        let parsed: KeywordTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed, table());

        let with_null: KeywordTable = serde_yaml::from_str("trend:\n").unwrap();
        assert_eq!(with_null, KeywordTable::new([("trend", Vec::<String>::new())]));
    }
}
