//! Run driver: every configured source, in order, into one collection.
//!
//! Sources are processed sequentially. Ordering of the collected items is:
//!
//! 1. all `rss_sources`, in list order, entries in feed order
//! 2. all `api_sources`, in list order
//! 3. all `crawler_sources`, in list order
//!
//! Each source runs inside its own failure boundary. An error from one source
//! is logged once, recorded in the [`RunReport`], and the run moves on.

use crate::config::AppConfig;
use crate::models::{CanonicalItem, SourceKind};
use crate::sources::{SourceContext, api, feed, scrape};
use crate::translate::Translator;
use std::error::Error;
use tracing::{error, info, instrument};

/// A source that contributed nothing because it failed outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub kind: SourceKind,
    pub source: String,
}

/// Outcome of collecting every configured source.
#[derive(Debug, Default)]
pub struct RunReport {
    pub items: Vec<CanonicalItem>,
    pub failures: Vec<SourceFailure>,
}

impl RunReport {
    fn absorb(
        &mut self,
        kind: SourceKind,
        source: &str,
        result: Result<Vec<CanonicalItem>, Box<dyn Error>>,
    ) {
        match result {
            Ok(items) => {
                info!(%kind, source, count = items.len(), "Source processed");
                self.items.extend(items);
            }
            Err(e) => {
                error!(%kind, source, error = %e, "Error processing source");
                self.failures.push(SourceFailure {
                    kind,
                    source: source.to_string(),
                });
            }
        }
    }

    /// `kind:name` of every failed source, for the closing log line.
    pub fn failed_sources(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("{}:{}", f.kind, f.source))
            .collect()
    }
}

/// Fetch and normalize every configured source.
///
/// # Arguments
///
/// * `config` - Source lists and keyword table, read once at startup
/// * `client` - Shared HTTP client for every request of the run
/// * `translator` - Backend applied to every title and summary
///
/// # Returns
///
/// A [`RunReport`] with the items in collection order and one
/// [`SourceFailure`] per source that failed outright. Never fails itself.
#[instrument(level = "info", skip_all)]
pub async fn collect_items<T: Translator>(
    config: &AppConfig,
    client: &reqwest::Client,
    translator: &T,
) -> RunReport {
    let ctx = SourceContext::new(client, translator, &config.keywords);
    let mut report = RunReport::default();

    for source in &config.rss_sources {
        let result = feed::fetch_items(source, &ctx).await;
        report.absorb(SourceKind::Feed, &source.name, result);
    }

    for source in &config.api_sources {
        let result = api::fetch_items(source, &ctx).await;
        report.absorb(SourceKind::Api, &source.name, result);
    }

    for source in &config.crawler_sources {
        let result = scrape::fetch_items(source, &ctx).await;
        report.absorb(SourceKind::Scrape, &source.name, result);
    }

    info!(
        total = report.items.len(),
        failed_sources = report.failures.len(),
        "Total items fetched"
    );
    report
}
