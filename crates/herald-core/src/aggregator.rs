//! Concurrent fan-out/fan-in over every (fetcher, topic) pair.
//!
//! A fixed pool of worker tasks pulls [`FetchTask`]s from a shared job
//! channel and pushes each [`TaskOutcome`] onto a results channel. Only the
//! coordinating routine reads that channel, so the titles-seen set and both
//! accumulators have a single writer and need no locks.
//!
//! ```text
//! (fetcher × topic) ──> job channel ──> worker 1..N ──> results channel ──> coordinator
//!                                                                          (dedup, accumulate)
//! ```
//!
//! A failed task aborts the run with [`AppError::TaskFailed`]. Outstanding
//! work is not cancelled: workers keep draining the job channel, and the
//! coordinator waits for every dispatched task to settle before returning
//! the error. Results arriving after the failure are discarded.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Article;
use crate::traits::ContentFetcher;

/// Events emitted during an aggregation run for monitoring/logging.
#[derive(Debug, Clone)]
pub enum AggregationEvent<'a> {
    Started {
        run_id: Uuid,
        tasks: usize,
        workers: usize,
    },
    TaskCompleted {
        fetcher: &'a str,
        topic: &'a str,
        fetched: usize,
        kept: usize,
    },
    TaskFailed {
        fetcher: &'a str,
        topic: &'a str,
        error: &'a str,
    },
    Finished {
        run_id: Uuid,
        articles: usize,
        duplicates_dropped: usize,
    },
}

/// Trait for receiving aggregation events (decoupled logging).
pub trait AggregationReporter: Send + Sync {
    fn report(&self, event: AggregationEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAggregationReporter;

impl AggregationReporter for TracingAggregationReporter {
    fn report(&self, event: AggregationEvent<'_>) {
        match event {
            AggregationEvent::Started {
                run_id,
                tasks,
                workers,
            } => {
                tracing::info!(%run_id, %tasks, %workers, "Aggregation started");
            }
            AggregationEvent::TaskCompleted {
                fetcher,
                topic,
                fetched,
                kept,
            } => {
                tracing::info!(%fetcher, %topic, %fetched, %kept, "Task completed");
            }
            AggregationEvent::TaskFailed {
                fetcher,
                topic,
                error,
            } => {
                tracing::warn!(%fetcher, %topic, %error, "Task failed");
            }
            AggregationEvent::Finished {
                run_id,
                articles,
                duplicates_dropped,
            } => {
                tracing::info!(%run_id, %articles, %duplicates_dropped, "Aggregation finished");
            }
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Upper bound on concurrently running fetch tasks.
    pub max_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

impl AggregatorConfig {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// Result of a successful aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub run_id: Uuid,
    /// Deduplicated articles, newest first; undated articles last.
    pub articles: Vec<Article>,
    /// Kept articles grouped by the topic of the task that produced them.
    pub by_topic: BTreeMap<String, Vec<Article>>,
    /// Articles dropped because their title was already seen in this run.
    pub duplicates_dropped: usize,
}

/// One unit of concurrent work.
struct FetchTask<F> {
    fetcher: F,
    topic: String,
}

struct TaskOutcome {
    fetcher: String,
    topic: String,
    result: Result<Vec<Article>, AppError>,
}

/// Transient state of one run, owned by the coordinator.
#[derive(Default)]
struct RunState {
    seen_titles: HashSet<String>,
    by_topic: BTreeMap<String, Vec<Article>>,
    articles: Vec<Article>,
    duplicates_dropped: usize,
}

impl RunState {
    /// First writer wins: an article whose title was already seen is dropped.
    /// Returns how many articles were kept.
    fn accept(&mut self, topic: &str, fetched: Vec<Article>) -> usize {
        let mut kept = 0;
        for article in fetched {
            if self.seen_titles.contains(&article.title) {
                self.duplicates_dropped += 1;
                continue;
            }
            self.seen_titles.insert(article.title.clone());
            self.by_topic
                .entry(topic.to_string())
                .or_default()
                .push(article.clone());
            self.articles.push(article);
            kept += 1;
        }
        kept
    }
}

/// Sort newest first. `None` orders below every timestamp, so undated
/// articles end up last. `sort_by` is stable, so ties keep insertion order.
pub fn sort_by_recency(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Aggregates articles from a fixed set of fetchers across topics.
///
/// One-shot per call: no run state survives between invocations.
pub struct Aggregator<F>
where
    F: ContentFetcher + 'static,
{
    fetchers: Vec<F>,
    config: AggregatorConfig,
}

impl<F> Aggregator<F>
where
    F: ContentFetcher + 'static,
{
    pub fn new(fetchers: Vec<F>, config: AggregatorConfig) -> Self {
        Self { fetchers, config }
    }

    /// Fetch, deduplicate and sort articles for every (fetcher, topic) pair.
    pub async fn fetch_all_content(&self, topics: &[String]) -> Result<Vec<Article>, AppError> {
        self.aggregate(topics).await.map(|report| report.articles)
    }

    /// Like [`fetch_all_content`](Self::fetch_all_content), returning the full
    /// run report and logging through `tracing`.
    pub async fn aggregate(&self, topics: &[String]) -> Result<AggregateReport, AppError> {
        self.aggregate_with_reporter(topics, &TracingAggregationReporter)
            .await
    }

    pub async fn aggregate_with_reporter<R: AggregationReporter>(
        &self,
        topics: &[String],
        reporter: &R,
    ) -> Result<AggregateReport, AppError> {
        let run_id = Uuid::new_v4();
        let tasks: Vec<FetchTask<F>> = self
            .fetchers
            .iter()
            .flat_map(|fetcher| {
                topics.iter().map(move |topic| FetchTask {
                    fetcher: fetcher.clone(),
                    topic: topic.clone(),
                })
            })
            .collect();

        let task_count = tasks.len();
        let workers = self.config.max_concurrency.max(1).min(task_count);
        reporter.report(AggregationEvent::Started {
            run_id,
            tasks: task_count,
            workers,
        });

        let mut state = RunState::default();

        if task_count > 0 {
            let (job_tx, job_rx) = mpsc::channel(task_count);
            for task in tasks {
                // Capacity equals the task count, so this never waits.
                if job_tx.send(task).await.is_err() {
                    break;
                }
            }
            drop(job_tx);

            let job_rx = Arc::new(Mutex::new(job_rx));
            let (result_tx, mut result_rx) = mpsc::channel(task_count);
            for _ in 0..workers {
                tokio::spawn(run_worker(Arc::clone(&job_rx), result_tx.clone()));
            }
            drop(result_tx);

            let mut failure: Option<AppError> = None;
            while let Some(outcome) = result_rx.recv().await {
                if failure.is_some() {
                    continue;
                }
                match outcome.result {
                    Ok(fetched) => {
                        let count = fetched.len();
                        let kept = state.accept(&outcome.topic, fetched);
                        reporter.report(AggregationEvent::TaskCompleted {
                            fetcher: &outcome.fetcher,
                            topic: &outcome.topic,
                            fetched: count,
                            kept,
                        });
                    }
                    Err(e) => {
                        let message = e.to_string();
                        reporter.report(AggregationEvent::TaskFailed {
                            fetcher: &outcome.fetcher,
                            topic: &outcome.topic,
                            error: &message,
                        });
                        failure = Some(AppError::task_failed(outcome.fetcher, outcome.topic, e));
                    }
                }
            }

            if let Some(err) = failure {
                return Err(err);
            }
        }

        let RunState {
            mut articles,
            by_topic,
            duplicates_dropped,
            ..
        } = state;
        sort_by_recency(&mut articles);

        reporter.report(AggregationEvent::Finished {
            run_id,
            articles: articles.len(),
            duplicates_dropped,
        });

        Ok(AggregateReport {
            run_id,
            articles,
            by_topic,
            duplicates_dropped,
        })
    }
}

/// Pull tasks until the job queue is drained.
async fn run_worker<F>(
    jobs: Arc<Mutex<mpsc::Receiver<FetchTask<F>>>>,
    results: mpsc::Sender<TaskOutcome>,
) where
    F: ContentFetcher + 'static,
{
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        let result = task.fetcher.fetch(&task.topic).await;
        let outcome = TaskOutcome {
            fetcher: task.fetcher.name().to_string(),
            topic: task.topic,
            result,
        };
        // The coordinator only drops its receiver once every worker is done.
        let _ = results.send(outcome).await;
    }
}
