//! Append-only scrape reliability log and the report built from it.

pub mod error;
pub mod record;
pub mod report;
pub mod writer;

pub use error::ReliabilityError;
pub use record::{LogEntry, ReliabilityRecord, RetryRecord};
pub use report::{aggregate_records, report, ReliabilityReport, SourceStats};
pub use writer::ReliabilityLog;

/// Daily log files are named `scrape_YYYY-MM-DD.jsonl`; retries go to
/// `scrape_retries_YYYY-MM-DD.jsonl`.
pub(crate) const LOG_FILE_PREFIX: &str = "scrape_";
pub(crate) const RETRY_FILE_PREFIX: &str = "scrape_retries_";
pub(crate) const LOG_FILE_SUFFIX: &str = ".jsonl";
