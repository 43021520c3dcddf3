//! HTML page adapter for sites without a feed.
//!
//! Anchors whose `href` matches the handler's link pattern become items.
//! Pages carry no per-item dates or summaries, so every item is stamped with
//! the current time and uses its title as its summary.
//!
//! # Handlers
//!
//! | Handler | Link pattern | Base URL | Placeholder title |
//! |---------|--------------|----------|-------------------|
//! | `deepmind_blog` | `/blog/` | `https://deepmind.com` | `DeepMind Blog Post` |
//! | `anchor_links` | required | page origin | `Untitled` |
//!
//! Any field may be overridden per source. A source that declares no handler
//! is matched by name (`DeepMind`) or by having a `link_pattern`; anything
//! else is rejected rather than silently scraped with another site's rules.

use super::{REQUEST_TIMEOUT, SourceContext, absolutize};
use crate::config::{ScrapeHandler, ScrapeSource};
use crate::dates::now_iso;
use crate::models::CanonicalItem;
use crate::translate::Translator;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, error, info, instrument};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

const DEEPMIND_LINK_PATTERN: &str = "/blog/";
const DEEPMIND_BASE_URL: &str = "https://deepmind.com";
const DEEPMIND_PLACEHOLDER: &str = "DeepMind Blog Post";
const DEFAULT_PLACEHOLDER: &str = "Untitled";

/// Resolved scraping rules for one source.
#[derive(Debug, Clone)]
pub struct ScrapeProfile {
    pub handler: ScrapeHandler,
    pub link_pattern: Regex,
    pub base_url: Url,
    pub placeholder_title: String,
}

impl ScrapeProfile {
    /// Resolve the handler a source declared (or implied) into concrete rules.
    pub fn for_source(source: &ScrapeSource) -> Result<Self, Box<dyn Error>> {
        let handler = match source.handler {
            Some(handler) => handler,
            None if source.name == "DeepMind" => ScrapeHandler::DeepmindBlog,
            None if source.link_pattern.is_some() => ScrapeHandler::AnchorLinks,
            None => {
                return Err(format!("no scrape handler declared for source '{}'", source.name).into());
            }
        };

        let (pattern, base, placeholder) = match handler {
            ScrapeHandler::DeepmindBlog => (
                source.link_pattern.clone().unwrap_or_else(|| DEEPMIND_LINK_PATTERN.to_string()),
                source.base_url.clone().unwrap_or_else(|| DEEPMIND_BASE_URL.to_string()),
                source
                    .placeholder_title
                    .clone()
                    .unwrap_or_else(|| DEEPMIND_PLACEHOLDER.to_string()),
            ),
            ScrapeHandler::AnchorLinks => {
                let pattern = source.link_pattern.clone().ok_or_else(|| {
                    format!("anchor_links source '{}' needs a link_pattern", source.name)
                })?;
                let base = match &source.base_url {
                    Some(base) => base.clone(),
                    None => Url::parse(&source.url)?.origin().ascii_serialization(),
                };
                let placeholder = source
                    .placeholder_title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());
                (pattern, base, placeholder)
            }
        };

        Ok(Self {
            handler,
            link_pattern: Regex::new(&pattern)?,
            base_url: Url::parse(&base)?,
            placeholder_title: placeholder,
        })
    }
}

/// One candidate link extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedLink {
    /// Absolute URL.
    pub href: String,
    /// Visible anchor text, or the profile's placeholder.
    pub title: String,
}

/// Select matching anchors, keep the first occurrence of each exact `href`,
/// absolutize and title them.
pub fn extract_links(html: &str, profile: &ScrapeProfile) -> Vec<ScrapedLink> {
    let document = Html::parse_document(html);

    let candidates: Vec<(String, String)> = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            if href.is_empty() || !profile.link_pattern.is_match(href) {
                return None;
            }
            let text: String = a.text().map(str::trim).collect();
            Some((href.to_string(), text))
        })
        .collect();
    info!(count = candidates.len(), "Found potential links");

    candidates
        .into_iter()
        .unique_by(|(href, _)| href.clone())
        .map(|(href, text)| {
            let href = if href.starts_with("http") {
                href
            } else {
                absolutize(&profile.base_url, &href)
            };
            let title = if text.is_empty() {
                profile.placeholder_title.clone()
            } else {
                text
            };
            ScrapedLink { href, title }
        })
        .collect()
}

/// Fetch the page once and turn every distinct matching anchor into an item.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn fetch_items<T: Translator>(
    source: &ScrapeSource,
    ctx: &SourceContext<'_, T>,
) -> Result<Vec<CanonicalItem>, Box<dyn Error>> {
    let profile = ScrapeProfile::for_source(source)?;
    info!(handler = ?profile.handler, url = %source.url, "Processing crawler source");

    let response = ctx
        .client
        .get(&source.url)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        error!(status = status.as_u16(), "Crawler request failed with status code");
        return Ok(Vec::new());
    }

    let html = response.text().await?;
    let links = extract_links(&html, &profile);
    debug!(unique = links.len(), "Deduplicated links");

    let mut items = Vec::with_capacity(links.len());
    for link in links {
        let item = ctx
            .build_item(&source.name, &link.title, &link.title, now_iso(), link.href)
            .await;
        items.push(item);
    }

    Ok(items)
}
