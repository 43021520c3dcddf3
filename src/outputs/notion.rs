//! Notion database sink.
//!
//! Each item becomes one page in the configured database. The database must
//! already have these properties:
//!
//! | Property | Notion type | Item field |
//! |----------|-------------|------------|
//! | `Name` | title | `title` |
//! | `Source` | rich_text | `source` |
//! | `Published` | date | `published` |
//! | `Type` | select | `type` |
//! | `Link` | url | `link` |
//! | `Summary` | rich_text | `summary` |

use crate::config::NotionConfig;
use crate::models::CanonicalItem;
use crate::sources::REQUEST_TIMEOUT;
use crate::utils::truncate_for_log;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::error::Error;
use tracing::{debug, error, instrument};

pub const DEFAULT_API_BASE: &str = "https://api.notion.com";
pub const DEFAULT_VERSION: &str = "2022-06-28";

/// Client for creating pages in one Notion database.
#[derive(Debug, Clone)]
pub struct NotionSink {
    client: reqwest::Client,
    api_base: String,
    version: String,
    token: String,
    database_id: String,
}

impl NotionSink {
    /// Build a sink from config, or `None` when the sink is disabled or lacks
    /// a token or database id.
    pub fn from_config(client: reqwest::Client, config: &NotionConfig) -> Option<Self> {
        let (token, database_id) = config.credentials()?;
        Some(Self {
            client,
            api_base: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            version: config.version.clone().unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            token: token.to_string(),
            database_id: database_id.to_string(),
        })
    }

    /// Create one page for `item`.
    ///
    /// Any status other than 200 is an error; the response body is logged.
    #[instrument(level = "debug", skip_all, fields(link = %item.link))]
    pub async fn push_item(&self, item: &CanonicalItem) -> Result<Value, Box<dyn Error>> {
        let response = self
            .client
            .post(format!("{}/v1/pages", self.api_base))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .json(&page_payload(item, &self.database_id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %truncate_for_log(&body, 300),
                "Notion API error"
            );
            return Err(format!("failed to push item to Notion: HTTP {status}").into());
        }

        let page: Value = response.json().await?;
        debug!(page_id = ?page.get("id"), "Created Notion page");
        Ok(page)
    }
}

/// Request body for `POST /v1/pages`.
pub fn page_payload(item: &CanonicalItem, database_id: &str) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Name": { "title": [ { "text": { "content": item.title } } ] },
            "Source": { "rich_text": [ { "text": { "content": item.source } } ] },
            "Published": { "date": { "start": item.published } },
            "Type": { "select": { "name": item.category.label() } },
            "Link": { "url": item.link },
            "Summary": { "rich_text": [ { "text": { "content": item.summary } } ] }
        }
    })
}
