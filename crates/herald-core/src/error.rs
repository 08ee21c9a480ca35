use thiserror::Error;

/// Application-wide error types for Herald.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required setting missing or a value failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Fetcher-level failure: missing credentials or an unusable payload.
    #[error("Fetcher error: {0}")]
    FetcherError(String),

    /// Source answered with a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Every attempt of a retried operation failed.
    #[error("Failed after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    /// A single (fetcher, topic) task failed and aborted the aggregation run.
    #[error("Error processing {fetcher} results for {topic}: {source}")]
    TaskFailed {
        fetcher: String,
        topic: String,
        #[source]
        source: Box<AppError>,
    },

    /// Output could not be written.
    #[error("Writer error: {0}")]
    WriterError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    pub fn task_failed(fetcher: impl Into<String>, topic: impl Into<String>, source: AppError) -> Self {
        AppError::TaskFailed {
            fetcher: fetcher.into(),
            topic: topic.into(),
            source: Box::new(source),
        }
    }

    /// Returns true for transport/protocol failures raised by a source call.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }
}
