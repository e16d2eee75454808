use brandlist_core::{ErrorKind, JobError};
use thiserror::Error;

/// Failure of a single page fetch, after page classification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("blocked while fetching {url} (status {status:?})")]
    Blocked { url: String, status: Option<u16> },

    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page fetcher unavailable: {reason}")]
    Unavailable { reason: String },
}

impl FetchError {
    /// The outcome-level kind recorded for this failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout { .. } => ErrorKind::Timeout,
            FetchError::Blocked { .. } => ErrorKind::Blocked,
            FetchError::Http { status, .. } => ErrorKind::HttpError { status: *status },
            FetchError::Network { .. } | FetchError::Unavailable { .. } => ErrorKind::Network,
            FetchError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
        }
    }
}

/// Errors surfaced to the caller of the orchestrator. Job-level scrape
/// failures never appear here; they are recorded on the outcome instead.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("invalid job at index {index}: {source}")]
    InvalidJob {
        index: usize,
        #[source]
        source: JobError,
    },

    #[error("page fetcher is unavailable: {0}")]
    FetcherUnavailable(#[source] FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}
