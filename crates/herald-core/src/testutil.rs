//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::aggregator::{AggregationEvent, AggregationReporter};
use crate::error::AppError;
use crate::models::{Article, parse_timestamp};
use crate::traits::ContentFetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

type ScriptedResponses = HashMap<String, VecDeque<Result<Vec<Article>, AppError>>>;

/// Mock fetcher with scripted responses per topic.
///
/// Each call for a topic pops the first scripted response. When the queue
/// for a topic is empty, returns an empty article list.
#[derive(Clone)]
pub struct MockFetcher {
    name: String,
    responses: Arc<Mutex<ScriptedResponses>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(self, topic: &str, response: Result<Vec<Article>, AppError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn with_responses(
        self,
        topic: &str,
        responses: Vec<Result<Vec<Article>, AppError>>,
    ) -> Self {
        responses
            .into_iter()
            .fold(self, |fetcher, r| fetcher.with_response(topic, r))
    }

    /// Delay every call for `topic` by `delay` before answering.
    pub fn with_delay(self, topic: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(topic.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, topic: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == topic)
            .count()
    }

    /// Highest number of concurrent `fetch` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ContentFetcher for MockFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Article>, AppError> {
        self.calls.lock().unwrap().push(query.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        response.unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock aggregation reporter that records event labels.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl AggregationReporter for MockReporter {
    fn report(&self, event: AggregationEvent<'_>) {
        let label = match &event {
            AggregationEvent::Started { .. } => "Started".to_string(),
            AggregationEvent::TaskCompleted { topic, .. } => format!("TaskCompleted:{topic}"),
            AggregationEvent::TaskFailed { topic, .. } => format!("TaskFailed:{topic}"),
            AggregationEvent::Finished { .. } => "Finished".to_string(),
        };
        self.events.lock().unwrap().push(label);
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create an article with a title and an optional RFC 3339 timestamp.
pub fn article(title: &str, published_at: Option<&str>) -> Article {
    Article::new(title)
        .unwrap()
        .with_published_at(published_at.and_then(parse_timestamp))
}
