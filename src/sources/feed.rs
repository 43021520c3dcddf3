//! Syndication feed adapter.
//!
//! Handles the three feed dialects found in the wild, detected from the
//! document's root element:
//!
//! | Root | Dialect | Entries | Date field |
//! |------|---------|---------|------------|
//! | `<rss>` | RSS 2.0 | `channel/item` | `pubDate` |
//! | `<rdf:RDF>` | RSS 1.0 | `item` | none |
//! | `<feed>` | Atom | `entry` | `published` |
//!
//! Every entry becomes an item, even when title or summary is missing.

use super::{SourceContext, absolutize};
use crate::config::FeedSource;
use crate::dates::normalize_date;
use crate::models::CanonicalItem;
use crate::text::clean_text;
use crate::translate::Translator;
use quick_xml::Reader;
use quick_xml::de::{DeError, Deserializer, EntityResolver};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use serde::Deserialize;
use std::convert::Infallible;
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// One feed entry before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    /// Raw summary, possibly containing markup.
    pub summary: String,
    pub published: Option<String>,
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Option<AtomText>,
    #[serde(default)]
    summary: Option<AtomText>,
    #[serde(default)]
    content: Option<AtomText>,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl From<RssItem> for FeedEntry {
    fn from(item: RssItem) -> Self {
        FeedEntry {
            title: item.title.unwrap_or_default(),
            summary: item.description.unwrap_or_default(),
            published: item.pub_date,
            link: item.link.unwrap_or_default(),
        }
    }
}

impl From<AtomEntry> for FeedEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| entry.links.first())
            .and_then(|l| l.href.clone())
            .unwrap_or_default();

        FeedEntry {
            title: entry.title.map(|t| t.value).unwrap_or_default(),
            summary: entry
                .summary
                .or(entry.content)
                .map(|t| t.value)
                .unwrap_or_default(),
            published: entry.published,
            link,
        }
    }
}

/// Resolves the full HTML5 named-entity set on top of the five XML ones.
///
/// Feeds routinely carry `&eacute;`, `&rarr;` or `&nbsp;` in titles and
/// escaped descriptions, none of which XML defines.
#[derive(Debug, Default, Clone, Copy)]
struct HtmlEntities;

impl EntityResolver for HtmlEntities {
    type Error = Infallible;

    fn capture(&mut self, _doctype: BytesText) -> Result<(), Self::Error> {
        Ok(())
    }

    fn resolve(&self, entity: &str) -> Option<&str> {
        resolve_html5_entity(entity)
    }
}

fn deserialize_feed<'de, T: Deserialize<'de>>(xml: &'de str) -> Result<T, DeError> {
    let mut de = Deserializer::from_str_with_resolver(xml, HtmlEntities);
    T::deserialize(&mut de)
}

fn is_xhtml(start: &BytesStart) -> Result<bool, Box<dyn Error>> {
    Ok(start
        .try_get_attribute("type")?
        .is_some_and(|attr| attr.value.as_ref() == b"xhtml"))
}

/// Wrap the body of every `type="xhtml"` Atom summary or content element in
/// CDATA, so the markup reaches the text cleaner instead of being discarded
/// as child elements.
fn inline_xhtml_bodies(xml: &str) -> Result<String, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len());
    let mut copied = 0;

    loop {
        match reader.read_event()? {
            Event::Start(start) if matches!(start.local_name().as_ref(), b"summary" | b"content") => {
                if !is_xhtml(&start)? {
                    continue;
                }
                let end = start.to_end().into_owned();
                let span = reader.read_to_end(end.name())?;
                let (from, to) = (span.start as usize, span.end as usize);
                out.push_str(&xml[copied..from]);
                out.push_str("<![CDATA[");
                out.push_str(&xml[from..to].replace("]]>", "]]]]><![CDATA[>"));
                out.push_str("]]>");
                copied = to;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    out.push_str(&xml[copied..]);
    Ok(out)
}

/// Local name of the document's root element.
fn root_element(xml: &str) -> Result<String, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err("feed document has no root element".into()),
            _ => {}
        }
    }
}

/// Parse a feed document into raw entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, Box<dyn Error>> {
    let xml = xml.trim_start_matches('\u{feff}').trim_start();
    let root = root_element(xml)?;
    debug!(%root, "Detected feed dialect");

    let entries = match root.as_str() {
        "rss" => {
            let rss: Rss = deserialize_feed(xml)?;
            rss.channel.items.into_iter().map(FeedEntry::from).collect()
        }
        "RDF" => {
            let rdf: Rdf = deserialize_feed(xml)?;
            rdf.items.into_iter().map(FeedEntry::from).collect()
        }
        "feed" => {
            let xml = inline_xhtml_bodies(xml)?;
            let atom: AtomFeed = deserialize_feed(&xml)?;
            atom.entries.into_iter().map(FeedEntry::from).collect()
        }
        other => return Err(format!("unsupported feed root element <{other}>").into()),
    };
    Ok(entries)
}

/// Fetch a feed and normalize every entry.
///
/// # Arguments
///
/// * `source` - The configured feed; its URL also resolves relative permalinks
/// * `ctx` - Shared client, translator and keyword table
///
/// # Returns
///
/// One item per entry in document order. Transport failures, non-success
/// statuses and unparseable documents are returned as errors.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn fetch_items<T: Translator>(
    source: &FeedSource,
    ctx: &SourceContext<'_, T>,
) -> Result<Vec<CanonicalItem>, Box<dyn Error>> {
    info!(url = %source.url, "Processing RSS source");
    let feed_url = Url::parse(&source.url)?;

    let body = ctx
        .client
        .get(feed_url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let entries = parse_feed(&body)?;
    info!(count = entries.len(), "Parsed feed entries");

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let summary = clean_text(&entry.summary);
        let published = normalize_date(entry.published.as_deref());
        let link = absolutize(&feed_url, &entry.link);
        let item = ctx
            .build_item(&source.name, entry.title.trim(), &summary, published, link)
            .await;
        items.push(item);
    }

    Ok(items)
}
