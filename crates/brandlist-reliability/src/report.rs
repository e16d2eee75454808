//! Per-source reliability statistics rebuilt from the daily logs.
//!
//! The report is derived on every call and never persisted. Unreadable files
//! and malformed lines are skipped with a warning so one bad entry cannot
//! blank the whole report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ReliabilityError;
use crate::record::{LogEntry, ReliabilityRecord};
use crate::writer::ReliabilityLog;
use crate::{LOG_FILE_PREFIX, LOG_FILE_SUFFIX};

const LAST_ERROR_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStats {
    pub runs: u64,
    pub successes: u64,
    /// Percentage of successful runs, rounded to one decimal; 0 when no runs.
    pub success_rate_pct: f64,
    pub total_brands: u64,
    pub blocked_count: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReliabilityReport {
    pub log_files: Vec<PathBuf>,
    pub per_source: BTreeMap<String, SourceStats>,
}

impl ReliabilityReport {
    /// Stats for `source`, zeroed when the source has no records.
    #[must_use]
    pub fn source(&self, source: &str) -> SourceStats {
        self.per_source.get(source).cloned().unwrap_or_default()
    }
}

/// Builds the report from every log file in `log`, optionally restricted to
/// the trailing `window_days` (UTC). `None` or `Some(0)` means no window.
///
/// # Errors
///
/// Returns [`ReliabilityError::Io`] only when the log directory exists but
/// cannot be listed. A missing directory yields an empty report.
pub async fn report(
    log: &ReliabilityLog,
    window_days: Option<u32>,
) -> Result<ReliabilityReport, ReliabilityError> {
    report_as_of(log, window_days, Utc::now().date_naive()).await
}

pub(crate) async fn report_as_of(
    log: &ReliabilityLog,
    window_days: Option<u32>,
    today: NaiveDate,
) -> Result<ReliabilityReport, ReliabilityError> {
    let cutoff = window_days
        .filter(|days| *days > 0)
        .and_then(|days| today.checked_sub_days(Days::new(u64::from(days))));

    let files = list_log_files(log, cutoff).await?;
    let mut records = Vec::new();

    for path in &files {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable reliability log");
                continue;
            }
        };

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(line) {
                Ok(LogEntry::SiteResult(record)) => {
                    if cutoff.is_some_and(|c| record.timestamp.date_naive() < c) {
                        continue;
                    }
                    records.push(record);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = idx + 1,
                        error = %e,
                        "skipping malformed reliability log entry"
                    );
                }
            }
        }
    }

    Ok(ReliabilityReport {
        log_files: files,
        per_source: aggregate_records(records),
    })
}

/// Groups records by source and computes the per-source statistics.
///
/// Records are expected in log order; `last_error` is the error of the latest
/// failing record.
pub fn aggregate_records<I>(records: I) -> BTreeMap<String, SourceStats>
where
    I: IntoIterator<Item = ReliabilityRecord>,
{
    let mut by_source: BTreeMap<String, SourceStats> = BTreeMap::new();

    for record in records {
        let key = if record.source.trim().is_empty() {
            "unknown".to_owned()
        } else {
            record.source
        };
        let stats = by_source.entry(key).or_default();
        stats.runs += 1;
        if record.success {
            stats.successes += 1;
        }
        stats.total_brands = stats.total_brands.saturating_add(record.brand_count);
        if record.blocked {
            stats.blocked_count += 1;
        }
        if let Some(err) = record.error.filter(|e| !e.is_empty()) {
            stats.last_error = Some(err.chars().take(LAST_ERROR_MAX_CHARS).collect());
        }
    }

    for stats in by_source.values_mut() {
        stats.success_rate_pct = success_rate_pct(stats.successes, stats.runs);
    }

    by_source
}

#[allow(clippy::cast_precision_loss)]
fn success_rate_pct(successes: u64, runs: u64) -> f64 {
    if runs == 0 {
        return 0.0;
    }
    (successes as f64 / runs as f64 * 1000.0).round() / 10.0
}

/// Lists daily log files in name (and therefore date) order, keeping those
/// dated on or after `cutoff`.
async fn list_log_files(
    log: &ReliabilityLog,
    cutoff: Option<NaiveDate>,
) -> Result<Vec<PathBuf>, ReliabilityError> {
    let dir = log.dir();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ReliabilityError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(source) => {
                return Err(ReliabilityError::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(parse_log_file_date) else {
            continue;
        };
        if cutoff.is_some_and(|c| date < c) {
            continue;
        }
        files.push(entry.path());
    }

    files.sort();
    Ok(files)
}

fn parse_log_file_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix(LOG_FILE_PREFIX)?
        .strip_suffix(LOG_FILE_SUFFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
