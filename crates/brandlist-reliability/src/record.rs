//! Log entry shapes written to the daily JSONL files.
//!
//! Each line is one JSON object tagged by `event`. Only `site_result` lines
//! feed the reliability report; `run_start` / `run_end` bracket a batch for
//! human inspection. Retries go to a separate daily file as untagged
//! [`RetryRecord`] lines.

use brandlist_core::RetailerOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one completed retailer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityRecord {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub success: bool,
    #[serde(rename = "brands_count", default)]
    pub brand_count: u64,
    #[serde(rename = "blocked_or_captcha", default)]
    pub blocked: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReliabilityRecord {
    /// Builds the record for a finalized outcome. A run counts as a success
    /// when it carries no error.
    #[must_use]
    pub fn from_outcome(outcome: &RetailerOutcome, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            source: outcome.retailer_name.clone(),
            success: outcome.succeeded(),
            brand_count: outcome.brands.len() as u64,
            blocked: outcome.blocked,
            error: outcome.error.map(|kind| kind.to_string()),
        }
    }
}

/// One retry decision: `attempt` failed with `reason` and another attempt
/// follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryRecord {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub attempt: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEntry {
    RunStart {
        timestamp: DateTime<Utc>,
        retailer_count: usize,
        max_brands: Option<usize>,
    },
    RunEnd {
        timestamp: DateTime<Utc>,
        retailers_processed: usize,
        total_brands: usize,
        partial_timeout: bool,
    },
    SiteResult(ReliabilityRecord),
}

impl LogEntry {
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogEntry::RunStart { timestamp, .. } | LogEntry::RunEnd { timestamp, .. } => {
                *timestamp
            }
            LogEntry::SiteResult(record) => record.timestamp,
        }
    }
}
