pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregator::{AggregateReport, Aggregator, AggregatorConfig};
pub use cache::{CacheConfig, CachedFetcher};
pub use config::{AppConfig, NewsApiConfig};
pub use error::AppError;
pub use models::{Article, parse_timestamp};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use traits::{ContentFetcher, ContentWriter};
