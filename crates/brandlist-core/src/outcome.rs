//! Per-retailer and per-batch scrape results.

use serde::{Deserialize, Serialize};

/// Why a retailer run did not finish cleanly, as stored on its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Blocked,
    HttpError { status: u16 },
    Network,
    InvalidUrl,
    /// The batch deadline fired before the job finished (or started).
    BatchTimeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Blocked => write!(f, "blocked"),
            ErrorKind::HttpError { status } => write!(f, "HTTP {status}"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::InvalidUrl => write!(f, "invalid URL"),
            ErrorKind::BatchTimeout => write!(f, "batch deadline exceeded"),
        }
    }
}

/// What ended a pagination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    NoNextPage,
    BrandCapReached,
    PageLimitReached,
    Failed,
    Deadline,
}

/// Final result of one scrape job.
///
/// `brands` keeps first-seen order across pages. An outcome with `error` set
/// may still carry brands from pages fetched before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerOutcome {
    pub retailer_name: String,
    pub brands: Vec<String>,
    pub pages_fetched: u32,
    pub blocked: bool,
    pub error: Option<ErrorKind>,
    pub stop_reason: StopReason,
    pub duration_ms: u64,
}

impl RetailerOutcome {
    /// Outcome for a job the batch deadline cut off before it started.
    #[must_use]
    pub fn timed_out(retailer_name: impl Into<String>) -> Self {
        Self {
            retailer_name: retailer_name.into(),
            brands: Vec::new(),
            pages_fetched: 0,
            blocked: false,
            error: Some(ErrorKind::BatchTimeout),
            stop_reason: StopReason::Deadline,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// All outcomes of one batch, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<RetailerOutcome>,
    pub partial_timeout: bool,
}

impl BatchResult {
    #[must_use]
    pub fn total_brands(&self) -> usize {
        self.outcomes.iter().map(|o| o.brands.len()).sum()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }
}
