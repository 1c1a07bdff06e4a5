// =============================================================================
// NewsAPI Client — headlines for a symbol
// =============================================================================
//
// NewsAPI wraps everything in `{status, articles}` and reports failures with
// `status: "error"` plus a message, sometimes still under HTTP 200. Articles
// are requested newest-first and capped at `page_size` per symbol.
// =============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::types::NewsItem;

/// NewsAPI REST client.
#[derive(Clone)]
pub struct NewsClient {
    api_key: String,
    base_url: String,
    page_size: u32,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    // Removed articles surface with null titles; tolerate them.
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    url: String,
    #[serde(rename = "urlToImage", default)]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: String,
}

impl NewsClient {
    /// Create a new `NewsClient`.
    ///
    /// # Arguments
    /// * `api_key`   — NewsAPI key (query parameter; never logged).
    /// * `base_url`  — provider root, normally `https://newsapi.org/v2`.
    /// * `page_size` — maximum headlines per fetch.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, page_size: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            page_size,
            client,
        }
    }

    /// GET /everything — latest English-language headlines mentioning
    /// `symbol`, newest first.
    #[instrument(skip(self), name = "news::fetch_news")]
    pub async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/everything?q={}&apiKey={}&pageSize={}&language=en&sortBy=publishedAt",
            self.base_url, symbol, self.api_key, self.page_size
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /everything request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse news response")?;

        if !status.is_success() {
            anyhow::bail!("NewsAPI /everything returned {}: {}", status, body);
        }

        let items = items_from_payload(body, self.page_size as usize)?;
        debug!(symbol, count = items.len(), "news fetched");
        Ok(items)
    }
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn items_from_payload(body: serde_json::Value, page_size: usize) -> Result<Vec<NewsItem>> {
    let envelope: NewsEnvelope =
        serde_json::from_value(body).context("unexpected news payload shape")?;

    if envelope.status != "ok" {
        anyhow::bail!(
            "news provider returned status '{}': {}",
            envelope.status,
            envelope.message.unwrap_or_default()
        );
    }

    let items = envelope
        .articles
        .into_iter()
        .take(page_size)
        .map(|article| NewsItem {
            title: article.title.unwrap_or_default(),
            summary: article.description.unwrap_or_default(),
            url: article.url,
            image: article.url_to_image,
            published_at: article.published_at,
        })
        .collect();

    Ok(items)
}
