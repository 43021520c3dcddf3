//! JSON API adapter.
//!
//! Expects a body shaped like the Twitter v2 timeline response:
//!
//! ```json
//! {"data": [{"id": "1790", "text": "...", "created_at": "2025-05-06T14:30:00.000Z"}]}
//! ```
//!
//! A missing `user_id` on a Twitter source or a non-200 status is logged and
//! contributes zero items without failing the source.

use super::{REQUEST_TIMEOUT, SourceContext};
use crate::config::{ApiProvider, ApiSource};
use crate::dates::normalize_date;
use crate::models::CanonicalItem;
use crate::text::clean_text;
use crate::translate::Translator;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use tracing::{error, info, instrument};

pub const DEFAULT_TWITTER_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_PERMALINK_TEMPLATE: &str = "https://twitter.com/i/web/status/{id}";

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    data: Vec<ApiRecord>,
}

#[derive(Debug, Deserialize)]
struct ApiRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl ApiRecord {
    fn id_string(&self) -> String {
        match &self.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Endpoint to call, or `None` when the source lacks the identifier its
/// provider needs.
fn endpoint(source: &ApiSource) -> Result<Option<String>, Box<dyn Error>> {
    match source.provider() {
        ApiProvider::Twitter => {
            let Some(user_id) = source.user_id.as_deref().filter(|id| !id.trim().is_empty()) else {
                return Ok(None);
            };
            let base = source
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_TWITTER_BASE)
                .trim_end_matches('/');
            Ok(Some(format!(
                "{base}/2/users/{}/tweets?max_results=5&tweet.fields=created_at",
                urlencoding::encode(user_id.trim())
            )))
        }
        ApiProvider::Generic => source
            .url
            .clone()
            .map(Some)
            .ok_or_else(|| format!("api source '{}' has no url", source.name).into()),
    }
}

fn permalink(source: &ApiSource, id: &str) -> String {
    source
        .permalink_template
        .as_deref()
        .unwrap_or(DEFAULT_PERMALINK_TEMPLATE)
        .replace("{id}", id)
}

/// Call the API once and normalize every record in `data`.
///
/// # Arguments
///
/// * `source` - The configured API source (provider, headers, identifiers)
/// * `ctx` - Shared client, translator and keyword table
///
/// # Returns
///
/// * `Ok(items)` - One item per record, in response order
/// * `Ok(vec![])` - A Twitter source without `user_id`, or a non-200 response
/// * `Err` - Transport failure or a body that is not `{"data": [...]}` JSON
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub async fn fetch_items<T: Translator>(
    source: &ApiSource,
    ctx: &SourceContext<'_, T>,
) -> Result<Vec<CanonicalItem>, Box<dyn Error>> {
    info!(provider = ?source.provider(), "Processing API source");

    let Some(url) = endpoint(source)? else {
        error!("Twitter source requires a 'user_id' in config");
        return Ok(Vec::new());
    };

    let request = source
        .headers
        .iter()
        .fold(ctx.client.get(&url), |req, (name, value)| {
            req.header(name.as_str(), value.as_str())
        })
        .timeout(REQUEST_TIMEOUT);
    let response = request.send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        error!(status = status.as_u16(), "API request failed with status code");
        return Ok(Vec::new());
    }

    let envelope: ApiEnvelope = response.json().await?;
    info!(count = envelope.data.len(), "Received API records");

    let mut items = Vec::with_capacity(envelope.data.len());
    for record in &envelope.data {
        let title = record.text.as_deref().unwrap_or_default();
        let summary = clean_text(title);
        let published = normalize_date(record.created_at.as_deref());
        let link = permalink(source, &record.id_string());
        let item = ctx
            .build_item(&source.name, title, &summary, published, link)
            .await;
        items.push(item);
    }

    Ok(items)
}
