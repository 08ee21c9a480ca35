use std::future::Future;

use crate::error::AppError;
use crate::models::Article;

/// Fetches articles for a topic query from one external source.
pub trait ContentFetcher: Send + Sync + Clone {
    /// Identity of the fetcher, used in logs and aggregate errors.
    fn name(&self) -> &str;

    /// Returns articles matching `query`, most recent first when the source
    /// supports ordering.
    fn fetch(&self, query: &str) -> impl Future<Output = Result<Vec<Article>, AppError>> + Send;
}

/// Persists the final article list of a run.
pub trait ContentWriter: Send + Sync {
    fn write(&self, articles: &[Article]) -> Result<(), AppError>;
}
