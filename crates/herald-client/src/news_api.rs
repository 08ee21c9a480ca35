use std::time::Duration;

use herald_core::config::NewsApiConfig;
use herald_core::error::AppError;
use herald_core::models::{Article, parse_timestamp};
use herald_core::traits::ContentFetcher;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const SOURCE_NAME: &str = "NewsAPI";
const USER_AGENT: &str = "Herald/0.1 (News Aggregator)";

/// Fetcher for the NewsAPI `everything` endpoint.
///
/// Requests English articles matching the query, sorted by publication date.
/// Entries without a usable title are skipped.
#[derive(Clone)]
pub struct NewsApiFetcher {
    client: Client,
    base_url: Url,
    api_key: String,
    timeout_secs: u64,
}

impl NewsApiFetcher {
    /// Fails with [`AppError::FetcherError`] when the API key is empty.
    pub fn new(config: &NewsApiConfig, timeout: Duration) -> Result<Self, AppError> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::FetcherError("NewsAPI credentials missing".into()));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::ConfigError(format!(
                "Invalid NEWS_API_BASE_URL '{}': {e}",
                config.base_url
            ))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sortBy", "publishedAt")
            .append_pair("language", "en")
            .append_pair("apiKey", &self.api_key);
        url
    }
}

// ---- NewsAPI payload types ----

#[derive(Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    author: Option<String>,
    description: Option<String>,
    source: Option<NewsApiSource>,
}

#[derive(Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl NewsApiArticle {
    fn into_article(self, query: &str) -> Option<Article> {
        let mut article = Article::new(self.title?)?
            .with_source(SOURCE_NAME)
            .with_published_at(self.published_at.as_deref().and_then(parse_timestamp))
            .with_topic(query)
            .with_metadata("author", self.author)
            .with_metadata("description", self.description);

        if let Some(url) = self.url {
            article = article.with_url(url);
        }
        if let Some(outlet) = self.source.and_then(|s| s.name) {
            article = article.with_metadata("outlet", outlet);
        }
        Some(article)
    }
}

impl ContentFetcher for NewsApiFetcher {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Article>, AppError> {
        tracing::debug!(%query, "Requesting NewsAPI");

        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AppError::NetworkError(format!("Connection failed: {e}"))
                } else {
                    AppError::HttpError(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(AppError::HttpError(format!(
                "HTTP {} from NewsAPI for '{query}': {detail}",
                status.as_u16()
            )));
        }

        let payload: EverythingResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::FetcherError(format!("Invalid NewsAPI response for '{query}': {e}"))
            }
        })?;

        let total = payload.articles.len();
        let articles: Vec<Article> = payload
            .articles
            .into_iter()
            .filter_map(|entry| entry.into_article(query))
            .collect();

        if articles.len() < total {
            tracing::debug!(%query, skipped = total - articles.len(), "Skipped entries without a title");
        }
        tracing::info!(%query, count = articles.len(), "Fetched NewsAPI articles");

        Ok(articles)
    }
}
