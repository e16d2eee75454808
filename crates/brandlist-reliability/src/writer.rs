//! Append-only writer for the daily reliability logs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::ReliabilityError;
use crate::record::{LogEntry, ReliabilityRecord, RetryRecord};
use crate::{LOG_FILE_PREFIX, LOG_FILE_SUFFIX, RETRY_FILE_PREFIX};

/// Handle to a log directory holding one `scrape_YYYY-MM-DD.jsonl` file per
/// UTC day, plus a `scrape_retries_YYYY-MM-DD.jsonl` file for retries.
///
/// Every entry is serialized up front and written with a single
/// `O_APPEND` write, so concurrent writers never interleave within a line.
/// Files are never rewritten or compacted here.
#[derive(Debug, Clone)]
pub struct ReliabilityLog {
    dir: PathBuf,
}

impl ReliabilityLog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding entries for `date`.
    #[must_use]
    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{LOG_FILE_PREFIX}{}{LOG_FILE_SUFFIX}",
            date.format("%Y-%m-%d")
        ))
    }

    /// Path of the retry file for `date`.
    #[must_use]
    pub fn retry_file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{RETRY_FILE_PREFIX}{}{LOG_FILE_SUFFIX}",
            date.format("%Y-%m-%d")
        ))
    }

    /// Appends one retailer run summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReliabilityError::Io`] if the directory cannot be created or
    /// the file cannot be opened or written (disk full, permission denied).
    pub async fn append(&self, record: &ReliabilityRecord) -> Result<(), ReliabilityError> {
        self.append_entry(&LogEntry::SiteResult(record.clone()))
            .await
    }

    /// Marks the start of a batch.
    ///
    /// # Errors
    ///
    /// See [`ReliabilityLog::append`].
    pub async fn run_started(
        &self,
        retailer_count: usize,
        max_brands: Option<usize>,
    ) -> Result<(), ReliabilityError> {
        self.append_entry(&LogEntry::RunStart {
            timestamp: Utc::now(),
            retailer_count,
            max_brands,
        })
        .await
    }

    /// Marks the end of a batch.
    ///
    /// # Errors
    ///
    /// See [`ReliabilityLog::append`].
    pub async fn run_finished(
        &self,
        retailers_processed: usize,
        total_brands: usize,
        partial_timeout: bool,
    ) -> Result<(), ReliabilityError> {
        self.append_entry(&LogEntry::RunEnd {
            timestamp: Utc::now(),
            retailers_processed,
            total_brands,
            partial_timeout,
        })
        .await
    }

    /// Appends any log entry to the file for the entry's UTC date.
    ///
    /// # Errors
    ///
    /// See [`ReliabilityLog::append`].
    pub async fn append_entry(&self, entry: &LogEntry) -> Result<(), ReliabilityError> {
        let line = serde_json::to_string(entry)?;
        let path = self.file_for(date_of(entry.timestamp()));
        self.append_line(&path, line).await
    }

    /// Records one retry decision in the retry file for its UTC date.
    ///
    /// # Errors
    ///
    /// See [`ReliabilityLog::append`].
    pub async fn append_retry(&self, retry: &RetryRecord) -> Result<(), ReliabilityError> {
        let line = serde_json::to_string(retry)?;
        let path = self.retry_file_for(date_of(retry.timestamp));
        self.append_line(&path, line).await
    }

    async fn append_line(&self, path: &Path, mut line: String) -> Result<(), ReliabilityError> {
        line.push('\n');

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ReliabilityError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let io_err = |source: std::io::Error| ReliabilityError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

fn date_of(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(source: &str, ts: DateTime<Utc>) -> ReliabilityRecord {
        ReliabilityRecord {
            timestamp: ts,
            source: source.to_owned(),
            success: true,
            brand_count: 3,
            blocked: false,
            error: None,
        }
    }

    #[tokio::test]
    async fn append_creates_directory_and_daily_file() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ReliabilityLog::new(tmp.path().join("logs"));
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 23, 59, 0).unwrap();

        log.append(&record("Beymen", ts)).await.unwrap();

        let path = tmp.path().join("logs").join("scrape_2026-05-02.jsonl");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(r#""event":"site_result""#));
        assert!(content.ends_with('\n'));
    }

    #[tokio::test]
    async fn records_are_partitioned_by_utc_day() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ReliabilityLog::new(tmp.path());
        let day1 = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 5, 3, 0, 0, 1).unwrap();

        log.append(&record("A", day1)).await.unwrap();
        log.append(&record("B", day1)).await.unwrap();
        log.append(&record("C", day2)).await.unwrap();

        let first = std::fs::read_to_string(tmp.path().join("scrape_2026-05-02.jsonl")).unwrap();
        let second = std::fs::read_to_string(tmp.path().join("scrape_2026-05-03.jsonl")).unwrap();
        assert_eq!(first.lines().count(), 2);
        assert_eq!(second.lines().count(), 1);
    }

    #[tokio::test]
    async fn retries_go_to_their_own_daily_file() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ReliabilityLog::new(tmp.path());
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        for attempt in 1..=2 {
            log.append_retry(&RetryRecord {
                timestamp: ts,
                source: "Vakko".to_owned(),
                attempt,
                reason: "timeout".to_owned(),
            })
            .await
            .unwrap();
        }

        let content =
            std::fs::read_to_string(tmp.path().join("scrape_retries_2026-05-02.jsonl")).unwrap();
        let retries: Vec<RetryRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(retries.len(), 2);
        assert_eq!(retries[1].attempt, 2);
        assert!(!tmp.path().join("scrape_2026-05-02.jsonl").exists());
    }

    #[tokio::test]
    async fn concurrent_appends_keep_lines_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let log = ReliabilityLog::new(tmp.path());
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        let writes: Vec<_> = (0..20)
            .map(|i| {
                let log = log.clone();
                tokio::spawn(async move { log.append(&record(&format!("source-{i}"), ts)).await })
            })
            .collect();
        for handle in writes {
            handle.await.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(tmp.path().join("scrape_2026-05-02.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 20);
        for line in content.lines() {
            serde_json::from_str::<LogEntry>(line).unwrap();
        }
    }

    #[tokio::test]
    async fn append_into_unwritable_location_reports_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, "file in the way").unwrap();
        let log = ReliabilityLog::new(&blocker);

        let err = log.append(&record("A", Utc::now())).await.unwrap_err();
        assert!(matches!(err, ReliabilityError::Io { .. }));
    }
}
