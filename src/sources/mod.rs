//! Source adapters that turn raw payloads into [`CanonicalItem`]s.
//!
//! Each adapter handles one source kind and follows the same pattern:
//!
//! 1. **Fetching**: one HTTP GET for the configured source
//! 2. **Extraction**: pull title, raw summary, date and link out of the payload
//! 3. **Normalization**: [`SourceContext::build_item`] cleans, translates,
//!    classifies and assembles the item
//!
//! # Supported Kinds
//!
//! | Config list | Module | Payload | Timeout |
//! |-------------|--------|---------|---------|
//! | `rss_sources` | [`feed`] | RSS 2.0 / RSS 1.0 / Atom | client default |
//! | `api_sources` | [`api`] | JSON `{"data": [...]}` | 10s |
//! | `crawler_sources` | [`scrape`] | HTML anchors | 10s |
//!
//! Adapters return `Err` only when the whole source is unusable; the
//! aggregator logs it and moves on to the next source.

use crate::classify::{KeywordTable, classify};
use crate::models::CanonicalItem;
use crate::translate::{Translator, translate_or_original};
use std::time::Duration;
use url::Url;

pub mod api;
pub mod feed;
pub mod scrape;

/// Timeout for API, scrape and Notion requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborators every adapter needs.
#[derive(Debug)]
pub struct SourceContext<'a, T> {
    pub client: &'a reqwest::Client,
    pub translator: &'a T,
    pub keywords: &'a KeywordTable,
}

impl<'a, T: Translator> SourceContext<'a, T> {
    pub fn new(client: &'a reqwest::Client, translator: &'a T, keywords: &'a KeywordTable) -> Self {
        Self {
            client,
            translator,
            keywords,
        }
    }

    /// Assemble one item from already-extracted fields.
    ///
    /// `summary` must already be cleaned. Classification runs on the original
    /// text; title and summary are translated independently.
    pub async fn build_item(
        &self,
        source: &str,
        title: &str,
        summary: &str,
        published: String,
        link: String,
    ) -> CanonicalItem {
        let category = classify(title, summary, self.keywords);
        let title_translated = translate_or_original(self.translator, title).await;
        let summary_translated = translate_or_original(self.translator, summary).await;

        CanonicalItem {
            source: source.to_string(),
            title: title_translated,
            summary: summary_translated,
            published,
            link,
            category,
        }
    }
}

/// Make `link` absolute against `base`. Absolute links are returned untouched;
/// links that cannot be joined are returned as-is.
pub fn absolutize(base: &Url, link: &str) -> String {
    let link = link.trim();
    if link.is_empty() || Url::parse(link).is_ok() {
        return link.to_string();
    }
    base.join(link)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| link.to_string())
}
