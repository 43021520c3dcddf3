//! Best-effort translation of titles and summaries.
//!
//! # Architecture
//!
//! - [`Translator`]: narrow async trait, text in and translated text out
//! - [`GoogleTranslator`]: calls the public Google Translate web endpoint
//! - [`Passthrough`]: identity translator used when translation is disabled
//! - [`ConfiguredTranslator`]: whichever of the two the run was configured with
//! - [`translate_or_original`]: the only entry point adapters use; it never
//!   fails and falls back to the untranslated text
//!
//! Translation is an enhancement. A network error, a quota response or a body
//! of unexpected shape costs one log line, never an item.

use crate::utils::truncate_for_log;
use serde_json::Value;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, instrument};

/// Default public endpoint, overridable for tests.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Default target language.
pub const DEFAULT_TARGET: &str = "zh-CN";

/// Trait for text-to-text translation backends.
pub trait Translator {
    /// Translate `text` into the backend's target language.
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>>;
}

/// Translator backed by `translate_a/single` with `client=gtx`.
///
/// The source language is auto-detected. The request carries no explicit
/// timeout and relies on the client defaults.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, target: impl Into<String>) -> Self {
        Self::with_endpoint(client, DEFAULT_ENDPOINT, target)
    }

    pub fn with_endpoint(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            target: target.into(),
        }
    }

    /// Routing parameters go in the query string, the text in the form body.
    fn request(&self, text: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/translate_a/single", self.endpoint))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
    }
}

impl Translator for GoogleTranslator {
    #[instrument(level = "debug", skip_all, fields(target = %self.target))]
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self
            .request(text)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;
        let translated = join_segments(&body)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = translated.chars().count(),
            "Translated text"
        );
        Ok(translated)
    }
}

/// The endpoint answers with `[[["translated", "original", ...], ...], ...]`,
/// one inner array per sentence.
fn join_segments(body: &Value) -> Result<String, Box<dyn Error>> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or("unexpected translation response shape")?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err("translation response had no text segments".into());
    }
    Ok(translated)
}

/// Identity translator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Translator for Passthrough {
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>> {
        Ok(text.to_string())
    }
}

/// The translator selected by CLI flags and the `translation` config section.
#[derive(Debug, Clone)]
pub enum ConfiguredTranslator {
    Google(GoogleTranslator),
    Passthrough(Passthrough),
}

impl Translator for ConfiguredTranslator {
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>> {
        match self {
            ConfiguredTranslator::Google(t) => t.translate(text).await,
            ConfiguredTranslator::Passthrough(t) => t.translate(text).await,
        }
    }
}

/// Translate `text`, returning it unchanged if the backend fails.
///
/// Blank input is returned as-is without calling the backend.
pub async fn translate_or_original<T: Translator>(translator: &T, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    match translator.translate(text).await {
        Ok(translated) => translated,
        Err(e) => {
            error!(
                error = %e,
                text = %truncate_for_log(text, 80),
                "Translation failed; keeping original text"
            );
            text.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::Cell;

    /// Prefixes every input with `zh:` so tests can see that translation ran.
    #[derive(Debug, Default)]
    pub struct Tagging {
        pub calls: Cell<usize>,
    }

    impl Translator for Tagging {
        async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("zh:{text}"))
        }
    }

    /// Always fails.
    #[derive(Debug, Default)]
    pub struct Broken;

    impl Translator for Broken {
        async fn translate(&self, _text: &str) -> Result<String, Box<dyn Error>> {
            Err("quota exceeded".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Broken, Tagging};
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fallback_returns_original_on_error() {
        let out = translate_or_original(&Broken, "Hello world").await;
        assert_eq!(out, "Hello world");
    }

    #[tokio::test]
    async fn test_blank_input_skips_backend() {
        let t = Tagging::default();
        assert_eq!(translate_or_original(&t, "").await, "");
        assert_eq!(translate_or_original(&t, "  ").await, "  ");
        assert_eq!(t.calls.get(), 0);

        assert_eq!(translate_or_original(&t, "hi").await, "zh:hi");
        assert_eq!(t.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_is_identity() {
        let t = ConfiguredTranslator::Passthrough(Passthrough);
        assert_eq!(translate_or_original(&t, "unchanged").await, "unchanged");
    }

    #[test]
    fn test_join_segments() {
        let body = json!([[["你好。", "Hello.", null, null, 1], ["世界", "World", null, null, 1]], null, "en"]);
        assert_eq!(join_segments(&body).unwrap(), "你好。世界");

        assert!(join_segments(&json!({"error": "nope"})).is_err());
        assert!(join_segments(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_google_translator_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("tl", "zh-CN"))
            .and(body_string("q=Deep+learning+%26+you"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([[["深度学习与你", "Deep learning & you", null, null, 1]], null, "en"])),
            )
            .mount(&server)
            .await;

        let t = GoogleTranslator::with_endpoint(reqwest::Client::new(), server.uri(), DEFAULT_TARGET);
        let out = translate_or_original(&t, "Deep learning & you").await;
        assert_eq!(out, "深度学习与你");
    }

    #[tokio::test]
    async fn test_long_text_stays_out_of_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate_a/single"))
            .and(body_string_contains("q=word+word+word"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["很长的摘要", "", null, null, 1]]])))
            .mount(&server)
            .await;

        let long_summary = "word ".repeat(4_000);
        let t = GoogleTranslator::with_endpoint(reqwest::Client::new(), server.uri(), DEFAULT_TARGET);
        assert_eq!(translate_or_original(&t, &long_summary).await, "很长的摘要");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.as_str().len() < 200, "{}", requests[0].url);
        assert!(!requests[0].url.as_str().contains("word"));
    }

    #[tokio::test]
    async fn test_google_translator_quota_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let t = ConfiguredTranslator::Google(GoogleTranslator::with_endpoint(
            reqwest::Client::new(),
            server.uri(),
            DEFAULT_TARGET,
        ));
        assert!(t.translate("Hello").await.is_err());
        assert_eq!(translate_or_original(&t, "Hello").await, "Hello");
    }
}
