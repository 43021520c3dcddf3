//! Run configuration loaded once from a YAML file.
//!
//! ```yaml
//! rss_sources:
//!   - name: OpenAI Blog
//!     url: https://openai.com/blog/rss.xml
//! api_sources:
//!   - name: Twitter AI
//!     user_id: "44196397"
//!     headers:
//!       Authorization: Bearer XXX
//! crawler_sources:
//!   - name: DeepMind
//!     url: https://deepmind.google/discover/blog/
//!     handler: deepmind_blog
//! keywords:
//!   course: [tutorial, course]
//!   case: [case study, example]
//!   trend: [release]
//! notion:
//!   enable: false
//!   token: secret_xxx
//!   database_id: abc123
//! translation:
//!   enable: true
//!   target: zh-CN
//! ```

use crate::classify::KeywordTable;
use crate::translate::DEFAULT_TARGET;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rss_sources: Vec<FeedSource>,
    #[serde(default)]
    pub api_sources: Vec<ApiSource>,
    #[serde(default)]
    pub crawler_sources: Vec<ScrapeSource>,
    #[serde(default)]
    pub keywords: KeywordTable,
    #[serde(default)]
    pub notion: Option<NotionConfig>,
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// A syndication feed (RSS 2.0, RSS 1.0 or Atom).
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// Which endpoint shape an API source speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiProvider {
    /// User-timeline endpoint built from `user_id`.
    Twitter,
    /// Plain GET of `url`.
    Generic,
}

/// A JSON API returning `{"data": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub provider: Option<ApiProvider>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub permalink_template: Option<String>,
}

impl ApiSource {
    /// Declared provider, or `twitter` for sources whose name mentions Twitter.
    pub fn provider(&self) -> ApiProvider {
        self.provider.unwrap_or_else(|| {
            if self.name.contains("Twitter") {
                ApiProvider::Twitter
            } else {
                ApiProvider::Generic
            }
        })
    }
}

/// Handler used to turn a scraped page into items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeHandler {
    /// DeepMind blog index: `/blog/` links on `https://deepmind.com`.
    DeepmindBlog,
    /// Any page, driven entirely by `link_pattern` and `base_url`.
    AnchorLinks,
}

/// An HTML page without a feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub handler: Option<ScrapeHandler>,
    #[serde(default)]
    pub link_pattern: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub placeholder_title: Option<String>,
}

/// Notion database sink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl NotionConfig {
    /// Token and database id, when the sink is enabled and both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if !self.enable {
            return None;
        }
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        let database_id = self.database_id.as_deref().filter(|d| !d.is_empty())?;
        Some((token, database_id))
    }
}

/// Translation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_target")]
    pub target: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            target: default_target(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

/// Accept `user_id: 12345` as well as `user_id: "12345"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

/// Parse a configuration document.
pub fn parse_config(yaml: &str) -> Result<AppConfig, Box<dyn Error>> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse the configuration file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    let config = parse_config(&raw)?;
    info!(
        rss = config.rss_sources.len(),
        api = config.api_sources.len(),
        crawler = config.crawler_sources.len(),
        keyword_keys = config.keywords.entries().len(),
        notion = config.notion.as_ref().is_some_and(|n| n.enable),
        "Loaded configuration"
    );
    Ok(config)
}
