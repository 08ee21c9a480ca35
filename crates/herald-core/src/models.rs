use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized news article.
///
/// `title` is the deduplication key of an aggregation run and is never blank.
/// Serializes to the output record shape
/// `{title, url, source, published_at, topic, metadata}` with `published_at`
/// as an RFC 3339 string or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: Option<String>,
    /// Origin identifier, e.g. the provider name.
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// The query that produced this article.
    pub topic: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Article {
    /// Create an article with only a title. Returns `None` for a blank title.
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return None;
        }
        Some(Self {
            title,
            url: None,
            source: None,
            published_at: None,
            topic: None,
            metadata: Map::new(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Insert a metadata entry. `None` values are stored as JSON `null`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Parse a source-provided timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `2024-01-01T02:00:00+02:00`),
/// offset-less ISO-8601 date-times (read as UTC, `T` or space separated,
/// optional fractional seconds) and bare dates (midnight UTC).
/// Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
