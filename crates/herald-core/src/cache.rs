//! Time-bounded result caching for fetchers.
//!
//! Wraps any [`ContentFetcher`] with an in-memory, per-instance TTL cache
//! keyed by query. A hit returns the stored articles verbatim without
//! touching the source; a miss calls the inner fetcher and stores the result
//! only if the call succeeded.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use herald_core::cache::{CacheConfig, CachedFetcher};
//!
//! # use herald_core::{AppError, Article, ContentFetcher};
//! # #[derive(Clone)] struct MyFetcher;
//! # impl ContentFetcher for MyFetcher {
//! #     fn name(&self) -> &str { "mine" }
//! #     async fn fetch(&self, _: &str) -> Result<Vec<Article>, AppError> { todo!() }
//! # }
//! let config = CacheConfig::new(100, Duration::from_secs(300));
//! let fetcher = CachedFetcher::new(MyFetcher, &config);
//! ```

use std::time::Duration;

use moka::future::Cache;

use crate::error::AppError;
use crate::models::Article;
use crate::traits::ContentFetcher;

/// Capacity and time-to-live of a fetcher cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached queries.
    pub capacity: u64,
    /// How long a cached result stays valid.
    pub ttl: Duration,
}

impl CacheConfig {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self { capacity, ttl }
    }
}

impl Default for CacheConfig {
    /// 100 entries, 300 seconds.
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

/// A [`ContentFetcher`] wrapper that caches successful results per query.
///
/// Clones share the same cache. The underlying `moka` cache is internally
/// synchronized, so concurrent workers may read and populate it at once.
#[derive(Clone)]
pub struct CachedFetcher<F> {
    inner: F,
    cache: Cache<String, Vec<Article>>,
}

impl<F: ContentFetcher> CachedFetcher<F> {
    pub fn new(inner: F, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .build();
        Self { inner, cache }
    }

    /// Cached articles for `query`, if present and not expired.
    pub async fn cached(&self, query: &str) -> Option<Vec<Article>> {
        self.cache.get(query).await
    }
}

impl<F: ContentFetcher> ContentFetcher for CachedFetcher<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Article>, AppError> {
        if let Some(articles) = self.cache.get(query).await {
            tracing::debug!(fetcher = %self.inner.name(), %query, count = articles.len(), "Cache hit");
            return Ok(articles);
        }

        let articles = self.inner.fetch(query).await?;
        self.cache
            .insert(query.to_string(), articles.clone())
            .await;
        tracing::debug!(fetcher = %self.inner.name(), %query, count = articles.len(), "Cached results");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockFetcher, article};

    fn config() -> CacheConfig {
        CacheConfig::new(100, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let inner = MockFetcher::new("mock").with_response(
            "rust",
            Ok(vec![
                article("A", Some("2024-01-02T00:00:00Z")),
                article("B", None),
            ]),
        );
        let fetcher = CachedFetcher::new(inner.clone(), &config());

        let first = fetcher.fetch("rust").await.unwrap();
        let second = fetcher.fetch("rust").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
        assert_eq!(inner.call_count("rust"), 1);
    }

    #[tokio::test]
    async fn different_queries_are_cached_separately() {
        let inner = MockFetcher::new("mock")
            .with_response("a", Ok(vec![article("A", None)]))
            .with_response("b", Ok(vec![article("B", None)]));
        let fetcher = CachedFetcher::new(inner.clone(), &config());

        assert_eq!(fetcher.fetch("a").await.unwrap()[0].title, "A");
        assert_eq!(fetcher.fetch("b").await.unwrap()[0].title, "B");
        assert_eq!(inner.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = MockFetcher::new("mock").with_responses(
            "rust",
            vec![
                Err(AppError::NetworkError("reset".into())),
                Ok(vec![article("A", None)]),
            ],
        );
        let fetcher = CachedFetcher::new(inner.clone(), &config());

        assert!(fetcher.fetch("rust").await.is_err());
        assert!(fetcher.cached("rust").await.is_none());

        let articles = fetcher.fetch("rust").await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(inner.call_count("rust"), 2);
    }

    #[tokio::test]
    async fn clones_share_the_cache() {
        let inner = MockFetcher::new("mock").with_response("rust", Ok(vec![article("A", None)]));
        let fetcher = CachedFetcher::new(inner.clone(), &config());
        let clone = fetcher.clone();

        fetcher.fetch("rust").await.unwrap();
        clone.fetch("rust").await.unwrap();

        assert_eq!(inner.call_count("rust"), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let inner = MockFetcher::new("mock").with_responses(
            "rust",
            vec![Ok(vec![article("Old", None)]), Ok(vec![article("New", None)])],
        );
        let fetcher = CachedFetcher::new(
            inner.clone(),
            &CacheConfig::new(100, Duration::from_millis(50)),
        );

        assert_eq!(fetcher.fetch("rust").await.unwrap()[0].title, "Old");
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fetcher.fetch("rust").await.unwrap()[0].title, "New");
        assert_eq!(inner.call_count("rust"), 2);
    }

    #[tokio::test]
    async fn name_is_delegated() {
        let fetcher = CachedFetcher::new(MockFetcher::new("NewsAPI"), &config());
        assert_eq!(fetcher.name(), "NewsAPI");
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.ttl, Duration::from_secs(300));
    }
}
