//! Bounded-concurrency scheduling of scrape jobs.
//!
//! Jobs are validated and the fetcher is probed before anything is
//! scheduled; those are the only failures a caller sees. Every job-level
//! problem after that (fetch errors, blocks, the batch deadline) becomes
//! outcome data.

use std::time::Duration;

use brandlist_core::{AppConfig, BatchResult, ErrorKind, RetailerOutcome, ScrapeJob};
use brandlist_reliability::{ReliabilityLog, ReliabilityRecord};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::error::ScraperError;
use crate::extract::{BrandExtractor, GenericExtractor};
use crate::fetcher::PageFetcher;
use crate::paginator::Paginator;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;
pub const DEFAULT_CHUNK_SIZE: usize = 200;

pub struct Orchestrator<F, E = GenericExtractor> {
    paginator: Paginator<F, E>,
    concurrency_limit: usize,
    chunk_size: usize,
    default_deadline: Option<Duration>,
    log: Option<ReliabilityLog>,
}

impl<F, E> Orchestrator<F, E> {
    /// Wraps `paginator` with default limits, no deadline and no reliability
    /// log.
    #[must_use]
    pub fn new(paginator: Paginator<F, E>) -> Self {
        Self {
            paginator,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_deadline: None,
            log: None,
        }
    }

    /// Wraps `paginator` with the limits, deadline and log directory of
    /// `config`.
    #[must_use]
    pub fn from_config(paginator: Paginator<F, E>, config: &AppConfig) -> Self {
        Self::new(paginator)
            .with_concurrency_limit(config.concurrency_limit)
            .with_chunk_size(config.chunk_size)
            .with_default_deadline(Duration::from_secs(config.batch_deadline_secs))
            .with_reliability_log(ReliabilityLog::new(&config.log_dir))
    }

    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Deadline applied by [`Orchestrator::scrape_many`] when the caller
    /// passes none.
    #[must_use]
    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = Some(deadline);
        self
    }

    /// Records run summaries in `log` and attaches it to the paginator for
    /// retry lines.
    #[must_use]
    pub fn with_reliability_log(self, log: ReliabilityLog) -> Self {
        Self {
            paginator: self.paginator.with_retry_log(log.clone()),
            log: Some(log),
            ..self
        }
    }

    #[must_use]
    pub fn paginator(&self) -> &Paginator<F, E> {
        &self.paginator
    }
}

impl<F: PageFetcher, E: BrandExtractor> Orchestrator<F, E> {
    /// Scrapes a single job.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidJob`] if the job fails validation.
    /// - [`ScraperError::FetcherUnavailable`] if the fetcher cannot serve
    ///   requests.
    ///
    /// Fetch failures during the scrape are recorded on the outcome instead.
    pub async fn scrape_one(&self, job: &ScrapeJob) -> Result<RetailerOutcome, ScraperError> {
        job.validate()
            .map_err(|source| ScraperError::InvalidJob { index: 0, source })?;
        self.ensure_fetcher().await?;

        let outcome = self.paginator.run(job).await;
        log_outcome(&outcome);
        self.record(&outcome).await;
        Ok(outcome)
    }

    /// Scrapes all `jobs` with at most `concurrency_limit` in flight.
    ///
    /// `per_retailer_cap`, when set, replaces every job's own brand cap.
    /// `deadline` falls back to the configured default. Outcomes are returned
    /// in submission order; jobs cut off by the deadline are present with a
    /// [`ErrorKind::BatchTimeout`] error and `partial_timeout` is set.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidJob`] naming the first invalid job; nothing
    ///   is scheduled.
    /// - [`ScraperError::FetcherUnavailable`] if the fetcher cannot serve
    ///   requests.
    pub async fn scrape_many(
        &self,
        jobs: Vec<ScrapeJob>,
        per_retailer_cap: Option<usize>,
        deadline: Option<Duration>,
    ) -> Result<BatchResult, ScraperError> {
        let jobs: Vec<ScrapeJob> = match per_retailer_cap {
            Some(cap) => jobs.iter().map(|job| job.with_max_brands(cap)).collect(),
            None => jobs,
        };
        for (index, job) in jobs.iter().enumerate() {
            job.validate()
                .map_err(|source| ScraperError::InvalidJob { index, source })?;
        }
        self.ensure_fetcher().await?;

        let deadline_at = deadline
            .or(self.default_deadline)
            .map(|d| Instant::now() + d);
        tracing::info!(
            jobs = jobs.len(),
            concurrency = self.concurrency_limit,
            chunk_size = self.chunk_size,
            ?per_retailer_cap,
            "starting batch scrape"
        );
        if let Some(log) = &self.log {
            if let Err(e) = log.run_started(jobs.len(), per_retailer_cap).await {
                tracing::warn!(error = %e, "failed to write run_start entry");
            }
        }

        let mut slots: Vec<Option<RetailerOutcome>> = vec![None; jobs.len()];
        for (chunk_index, chunk) in jobs.chunks(self.chunk_size).enumerate() {
            let offset = chunk_index * self.chunk_size;
            let mut finished = stream::iter(chunk.iter().enumerate())
                .map(|(i, job)| async move {
                    let outcome = self.run_job(job, deadline_at).await;
                    if let Some(outcome) = &outcome {
                        log_outcome(outcome);
                        self.record(outcome).await;
                    }
                    (offset + i, outcome)
                })
                .buffer_unordered(self.concurrency_limit);

            while let Some((index, outcome)) = finished.next().await {
                slots[index] = outcome;
            }
        }

        let outcomes: Vec<RetailerOutcome> = slots
            .into_iter()
            .zip(&jobs)
            .map(|(slot, job)| slot.unwrap_or_else(|| RetailerOutcome::timed_out(job.retailer_name())))
            .collect();
        let partial_timeout = outcomes
            .iter()
            .any(|o| o.error == Some(ErrorKind::BatchTimeout));
        let result = BatchResult {
            outcomes,
            partial_timeout,
        };

        if partial_timeout {
            tracing::warn!(
                timed_out = result
                    .outcomes
                    .iter()
                    .filter(|o| o.error == Some(ErrorKind::BatchTimeout))
                    .count(),
                "batch deadline cut jobs short"
            );
        }
        tracing::info!(
            retailers = result.outcomes.len(),
            failed = result.failed_count(),
            total_brands = result.total_brands(),
            partial_timeout,
            "batch scrape complete"
        );
        if let Some(log) = &self.log {
            if let Err(e) = log
                .run_finished(result.outcomes.len(), result.total_brands(), partial_timeout)
                .await
            {
                tracing::warn!(error = %e, "failed to write run_end entry");
            }
        }

        Ok(result)
    }

    /// Runs one job unless the deadline has already passed. `None` means the
    /// job never started.
    async fn run_job(&self, job: &ScrapeJob, deadline: Option<Instant>) -> Option<RetailerOutcome> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(
                retailer = job.retailer_name(),
                "batch deadline passed before job started"
            );
            return None;
        }
        Some(self.paginator.run_until(job, deadline).await)
    }

    async fn ensure_fetcher(&self) -> Result<(), ScraperError> {
        self.paginator
            .fetcher()
            .ensure_available()
            .await
            .map_err(ScraperError::FetcherUnavailable)
    }

    /// Appends the outcome to the reliability log. Write failures are logged
    /// and otherwise ignored.
    async fn record(&self, outcome: &RetailerOutcome) {
        let Some(log) = &self.log else {
            return;
        };
        let record = ReliabilityRecord::from_outcome(outcome, Utc::now());
        if let Err(e) = log.append(&record).await {
            tracing::warn!(
                retailer = %outcome.retailer_name,
                error = %e,
                "failed to write reliability record"
            );
        }
    }
}

fn log_outcome(outcome: &RetailerOutcome) {
    match &outcome.error {
        None => tracing::info!(
            retailer = %outcome.retailer_name,
            brands = outcome.brands.len(),
            pages = outcome.pages_fetched,
            duration_ms = outcome.duration_ms,
            "retailer scraped"
        ),
        Some(error) => tracing::warn!(
            retailer = %outcome.retailer_name,
            brands = outcome.brands.len(),
            pages = outcome.pages_fetched,
            blocked = outcome.blocked,
            error = %error,
            "retailer scrape failed"
        ),
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
