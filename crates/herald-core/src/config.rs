use std::time::Duration;

use crate::aggregator::AggregatorConfig;
use crate::cache::CacheConfig;
use crate::error::AppError;
use crate::retry::RetryPolicy;

const REQUIRED_KEYS: [&str; 2] = ["NEWS_API_KEY", "NEWS_API_BASE_URL"];

/// Credentials and endpoint for the NewsAPI fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Process-wide settings, built once at startup and passed into constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub news_api: NewsApiConfig,
    pub cache: CacheConfig,
    pub aggregator: AggregatorConfig,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Read configuration from environment variables.
    ///
    /// - `NEWS_API_KEY`, `NEWS_API_BASE_URL` (required)
    /// - `CACHE_SIZE` (optional, defaults to 100)
    /// - `CACHE_TTL` seconds (optional, defaults to 300)
    /// - `MAX_THREADS` (optional, defaults to 4)
    /// - `DEFAULT_TIMEOUT` seconds (optional, defaults to 30)
    /// - `RETRY_MAX_ATTEMPTS` (optional, defaults to 3)
    /// - `RETRY_DELAY` seconds (optional, defaults to 1, may be 0)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Every missing required key is reported in a single error.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::ConfigError(format!(
                "Missing required configuration keys: {}",
                missing.join(", ")
            )));
        }

        let news_api = NewsApiConfig {
            api_key: get("NEWS_API_KEY").unwrap_or_default(),
            base_url: get("NEWS_API_BASE_URL").unwrap_or_default(),
        };

        let cache = CacheConfig::new(
            parse_number(get("CACHE_SIZE"), "CACHE_SIZE", 100, 1)?,
            Duration::from_secs(parse_number(get("CACHE_TTL"), "CACHE_TTL", 300, 1)?),
        );
        let max_concurrency = parse_number(get("MAX_THREADS"), "MAX_THREADS", 4, 1)?;
        let request_timeout =
            Duration::from_secs(parse_number(get("DEFAULT_TIMEOUT"), "DEFAULT_TIMEOUT", 30, 1)?);
        let retry = RetryPolicy::new(
            parse_number(get("RETRY_MAX_ATTEMPTS"), "RETRY_MAX_ATTEMPTS", 3, 1)?,
            Duration::from_secs(parse_number(get("RETRY_DELAY"), "RETRY_DELAY", 1, 0)?),
        );

        Ok(Self {
            news_api,
            cache,
            aggregator: AggregatorConfig::default().with_max_concurrency(max_concurrency),
            request_timeout,
            retry,
        })
    }
}

fn parse_number<T>(raw: Option<String>, key: &str, default: T, min: T) -> Result<T, AppError>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    let parsed: T = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be an integer"))
    })?;
    if parsed < min {
        return Err(AppError::ConfigError(format!(
            "{key} must be at least {min}"
        )));
    }
    Ok(parsed)
}
