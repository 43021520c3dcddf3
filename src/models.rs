//! Data models shared by every stage of the aggregation pipeline.
//!
//! - [`CanonicalItem`]: the normalized record every source adapter emits
//! - [`Category`]: the fixed label set produced by the classifier
//! - [`SourceKind`]: which adapter family a configured source belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topical category assigned to an item by [`crate::classify::classify`].
///
/// Serialized values are the labels written to the JSON file and to the
/// Notion `Type` select property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "课程")]
    Course,
    #[serde(rename = "案例")]
    CaseStudy,
    #[default]
    #[serde(rename = "趋势新闻")]
    TrendingNews,
}

impl Category {
    /// Map a keyword-table key to its label. Unknown keys have no label.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "course" => Some(Category::Course),
            "case" => Some(Category::CaseStudy),
            "trend" => Some(Category::TrendingNews),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Course => "课程",
            Category::CaseStudy => "案例",
            Category::TrendingNews => "趋势新闻",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized piece of aggregated content.
///
/// Every adapter produces this shape regardless of whether the raw input was
/// a feed entry, a JSON API record or a scraped anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    /// Name of the configured source the item came from.
    pub source: String,
    /// Translated title.
    pub title: String,
    /// Translated, markup-free summary.
    pub summary: String,
    /// ISO-8601 timestamp with an explicit offset.
    pub published: String,
    /// Absolute permalink.
    pub link: String,
    /// Category label.
    #[serde(rename = "type")]
    pub category: Category,
}

/// Adapter family of a configured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Feed,
    Api,
    Scrape,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Feed => "rss",
            SourceKind::Api => "api",
            SourceKind::Scrape => "crawler",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_key() {
        assert_eq!(Category::from_key("course"), Some(Category::Course));
        assert_eq!(Category::from_key("case"), Some(Category::CaseStudy));
        assert_eq!(Category::from_key("trend"), Some(Category::TrendingNews));
        assert_eq!(Category::from_key("news"), None);
    }

    #[test]
    fn test_item_serializes_type_field_with_label() {
        let item = CanonicalItem {
            source: "Blog".to_string(),
            title: "标题".to_string(),
            summary: "摘要".to_string(),
            published: "2025-05-06T14:30:00+00:00".to_string(),
            link: "https://example.com/post".to_string(),
            category: Category::CaseStudy,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "案例");
        assert_eq!(json["source"], "Blog");
        assert!(json.get("category").is_none());

        let back: CanonicalItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_default_category_is_trending() {
        assert_eq!(Category::default(), Category::TrendingNews);
        assert_eq!(Category::default().to_string(), "趋势新闻");
    }
}
