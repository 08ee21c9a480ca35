use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::Article;
use crate::traits::ContentFetcher;

/// Fixed-delay retry policy.
///
/// Any error is retried. The delay is applied between attempts only, never
/// after the final one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, 1 second apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// Each failure is logged as a warning with its attempt index. When every
    /// attempt fails, returns [`AppError::RetryExhausted`] carrying the
    /// attempt count and the last error message.
    pub async fn run<T, Op, Fut>(&self, label: &str, mut op: Op) -> Result<T, AppError>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        %label,
                        attempt,
                        max_attempts,
                        error = %e,
                        transport = e.is_transport(),
                        "Attempt {attempt}/{max_attempts} failed"
                    );
                    last_error = Some(e);
                    if attempt < max_attempts && !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(AppError::RetryExhausted {
            attempts: max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }
}

/// A [`ContentFetcher`] wrapper that applies a [`RetryPolicy`] to every
/// `fetch` call of the inner fetcher.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: ContentFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: ContentFetcher> ContentFetcher for RetryingFetcher<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Article>, AppError> {
        let label = format!("{}:{}", self.inner.name(), query);
        self.policy
            .run(&label, || self.inner.fetch(query))
            .await
    }
}
