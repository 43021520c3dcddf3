//! Sinks for the aggregated item collection.
//!
//! # Submodules
//!
//! - [`json`]: writes the whole collection to one JSON file
//! - [`notion`]: pushes each item as a page into a Notion database
//!
//! Exactly one sink receives the collection per run: Notion when it is
//! enabled and has credentials, the JSON file otherwise.

pub mod json;
pub mod notion;

use crate::config::NotionConfig;
use crate::models::CanonicalItem;
use notion::NotionSink;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// What the chosen sink did with the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Notion { pushed: usize, failed: usize },
    File { path: PathBuf, count: usize },
}

/// Route `items` to the configured sink.
///
/// # Arguments
///
/// * `items` - The collected items, in collection order
/// * `notion` - The `notion` config section, if any
/// * `client` - HTTP client used for Notion requests
/// * `output_path` - Where the JSON file goes when Notion is not used
///
/// # Returns
///
/// [`Delivery::Notion`] with pushed and failed counts when Notion is enabled
/// and fully configured, otherwise [`Delivery::File`]. Per-item Notion
/// failures are logged and counted; only a failure to write the JSON file is
/// returned as an error.
#[instrument(level = "info", skip_all, fields(count = items.len()))]
pub async fn deliver(
    items: &[CanonicalItem],
    notion: Option<&NotionConfig>,
    client: &reqwest::Client,
    output_path: &Path,
) -> Result<Delivery, Box<dyn Error>> {
    if let Some(config) = notion.filter(|n| n.enable) {
        match NotionSink::from_config(client.clone(), config) {
            Some(sink) => return Ok(push_all(&sink, items).await),
            None => warn!("Notion sink enabled but token or database_id is missing; writing file instead"),
        }
    }

    json::write_items(items, output_path).await?;
    info!(path = %output_path.display(), "Data saved to file");
    Ok(Delivery::File {
        path: output_path.to_path_buf(),
        count: items.len(),
    })
}

async fn push_all(sink: &NotionSink, items: &[CanonicalItem]) -> Delivery {
    let mut pushed = 0;
    let mut failed = 0;
    for item in items {
        match sink.push_item(item).await {
            Ok(_) => pushed += 1,
            Err(e) => {
                failed += 1;
                error!(error = %e, source = %item.source, link = %item.link, "Error pushing item to Notion");
            }
        }
    }
    info!(pushed, failed, "Finished pushing items to Notion");
    Delivery::Notion { pushed, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn items() -> Vec<CanonicalItem> {
        ["a", "b", "c"]
            .iter()
            .map(|id| CanonicalItem {
                source: "Blog".into(),
                title: format!("title {id}"),
                summary: String::new(),
                published: "2025-05-06T14:30:00+00:00".into(),
                link: format!("https://example.com/{id}"),
                category: Category::TrendingNews,
            })
            .collect()
    }

    fn notion(base: &str) -> NotionConfig {
        NotionConfig {
            enable: true,
            token: Some("secret".into()),
            database_id: Some("db".into()),
            api_base: Some(base.into()),
            version: None,
        }
    }

    #[tokio::test]
    async fn test_disabled_notion_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregated_data.json");
        let mut config = notion("http://127.0.0.1:9");
        config.enable = false;

        let delivery = deliver(&items(), Some(&config), &reqwest::Client::new(), &path)
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::File { path: path.clone(), count: 3 });

        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[tokio::test]
    async fn test_enabled_without_credentials_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut config = notion("http://127.0.0.1:9");
        config.token = None;

        let delivery = deliver(&items(), Some(&config), &reqwest::Client::new(), &path)
            .await
            .unwrap();
        assert!(matches!(delivery, Delivery::File { count: 3, .. }));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_notion_failure_does_not_block_remaining_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(body_partial_json(json!({"properties": {"Link": {"url": "https://example.com/b"}}})))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ok"})))
            .with_priority(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unused.json");
        let delivery = deliver(&items(), Some(&notion(&server.uri())), &reqwest::Client::new(), &path)
            .await
            .unwrap();

        assert_eq!(delivery, Delivery::Notion { pushed: 2, failed: 1 });
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
        assert!(!path.exists());
    }
}
