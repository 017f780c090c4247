use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{NewsSource, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::NewsArticle;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const MAX_PAGE_SIZE: u32 = 100;

/// NewsAPI `/v2/everything` adapter.
#[derive(Clone)]
pub struct NewsApiSource {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    page_size: u32,
    timeout_ms: u64,
}

impl NewsApiSource {
    /// The key travels in the `X-Api-Key` header, never in the URL.
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let auth = api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| HttpAuth::Header {
                name: String::from("x-api-key"),
                value: key,
            })
            .unwrap_or(HttpAuth::None);

        Self {
            http_client,
            auth,
            base_url: String::from(DEFAULT_BASE_URL),
            page_size: MAX_PAGE_SIZE,
            timeout_ms: 10_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn endpoint(&self, phrase: &str) -> String {
        let quoted = format!("\"{}\"", phrase.trim());
        format!(
            "{}/v2/everything?q={}&pageSize={}",
            self.base_url,
            urlencoding::encode(&quoted),
            self.page_size
        )
    }

    async fn fetch(&self, phrase: &str) -> Result<Vec<NewsArticle>, SourceError> {
        if self.auth == HttpAuth::None {
            return Err(SourceError::invalid_request("news API key is not configured"));
        }

        let request = HttpRequest::get(self.endpoint(phrase))
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        tracing::debug!(phrase, "querying newsapi");

        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!("newsapi transport error: {}", error.message()))
        })?;

        if response.status != 200 {
            return Err(SourceError::from_status("newsapi", response.status));
        }

        parse_articles(&response.body)
    }
}

impl NewsSource for NewsApiSource {
    fn id(&self) -> &'static str {
        "newsapi"
    }

    fn search_phrase<'a>(&'a self, phrase: &'a str) -> SourceFuture<'a, Vec<NewsArticle>> {
        Box::pin(async move { self.fetch(phrase).await })
    }
}

fn parse_articles(body: &str) -> Result<Vec<NewsArticle>, SourceError> {
    let response: NewsApiResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse newsapi response: {}", e)))?;

    if response.status.as_deref() == Some("error") {
        return Err(SourceError::unavailable(format!(
            "newsapi error {}: {}",
            response.code.as_deref().unwrap_or("unknown"),
            response.message.as_deref().unwrap_or("")
        )));
    }

    Ok(response.articles.into_iter().map(normalize_article).collect())
}

fn normalize_article(raw: NewsApiArticle) -> NewsArticle {
    NewsArticle {
        title: raw.title.unwrap_or_default(),
        summary: raw.description,
        url: raw.url.unwrap_or_default(),
        source_name: raw.source.and_then(|source| source.name),
        author: raw.author,
        published_at: raw.published_at,
    }
}

#[derive(Debug, Clone, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiArticleSource>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct NewsApiArticleSource {
    #[serde(default)]
    name: Option<String>,
}
