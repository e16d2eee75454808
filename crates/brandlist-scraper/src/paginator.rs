//! Fetch → extract loop for one retailer's pagination chain.

use std::collections::HashSet;
use std::time::Duration;

use brandlist_core::{AppConfig, ErrorKind, RetailerOutcome, ScrapeJob, StopReason};
use brandlist_reliability::{ReliabilityLog, RetryRecord};
use chrono::Utc;
use tokio::time::Instant;

use crate::classify::check_page;
use crate::error::FetchError;
use crate::extract::{BrandExtractor, GenericExtractor};
use crate::fetcher::{FetchConfig, FetchedPage, PageFetcher};
use crate::normalize::dedup_key;
use crate::retry::RetryPolicy;

/// Default pagination ceiling.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Drives one job's pages through the fetcher and extractor, retrying
/// transient fetch failures in place.
///
/// Each [`Paginator::run`] call owns its own accumulator, so one paginator
/// can serve many concurrent jobs.
#[derive(Debug)]
pub struct Paginator<F, E = GenericExtractor> {
    fetcher: F,
    extractor: E,
    fetch_config: FetchConfig,
    retry: RetryPolicy,
    max_pages: u32,
    inter_page_delay: Duration,
    retry_log: Option<ReliabilityLog>,
}

impl<F: PageFetcher> Paginator<F> {
    #[must_use]
    pub fn new(fetcher: F, fetch_config: FetchConfig, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            extractor: GenericExtractor,
            fetch_config,
            retry,
            max_pages: DEFAULT_MAX_PAGES,
            inter_page_delay: Duration::ZERO,
            retry_log: None,
        }
    }

    /// Builds a paginator with the fetch, retry and pagination settings of
    /// `config`.
    #[must_use]
    pub fn from_config(fetcher: F, config: &AppConfig) -> Self {
        Self::new(
            fetcher,
            FetchConfig::from_config(config),
            RetryPolicy::from_config(config),
        )
        .with_max_pages(config.max_pages)
        .with_inter_page_delay(Duration::from_millis(config.inter_page_delay_ms))
    }
}

impl<F, E> Paginator<F, E> {
    /// Replaces the brand extractor.
    #[must_use]
    pub fn with_extractor<E2: BrandExtractor>(self, extractor: E2) -> Paginator<F, E2> {
        Paginator {
            fetcher: self.fetcher,
            extractor,
            fetch_config: self.fetch_config,
            retry: self.retry,
            max_pages: self.max_pages,
            inter_page_delay: self.inter_page_delay,
            retry_log: self.retry_log,
        }
    }

    /// Sets the pagination ceiling. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    #[must_use]
    pub fn with_inter_page_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }

    /// Records every retry decision in `log`'s daily retry file.
    #[must_use]
    pub fn with_retry_log(mut self, log: ReliabilityLog) -> Self {
        self.retry_log = Some(log);
        self
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }
}

/// Why [`Paginator::fetch_page`] gave up on a page.
enum PageFailure {
    Fetch(FetchError),
    Deadline,
}

/// Per-run brand accumulator. Keeps first-seen order and stops growing at
/// the job's cap.
struct Accumulator {
    brands: Vec<String>,
    seen: HashSet<String>,
    cap: usize,
}

impl Accumulator {
    fn new(cap: usize) -> Self {
        Self {
            brands: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    fn merge(&mut self, names: Vec<String>) {
        for name in names {
            if self.is_full() {
                return;
            }
            let key = dedup_key(&name);
            if !key.is_empty() && self.seen.insert(key) {
                self.brands.push(name);
            }
        }
    }

    fn is_full(&self) -> bool {
        self.brands.len() >= self.cap
    }
}

impl<F: PageFetcher, E: BrandExtractor> Paginator<F, E> {
    /// Scrapes `job` with no deadline. Never fails: fetch errors end the chain
    /// and are recorded on the outcome along with the brands found so far.
    pub async fn run(&self, job: &ScrapeJob) -> RetailerOutcome {
        self.run_until(job, None).await
    }

    /// Scrapes `job`, stopping cooperatively at `deadline`.
    ///
    /// The deadline is checked before each fetch attempt and cuts backoff and
    /// inter-page waits short. A fetch already in flight is allowed to finish.
    pub async fn run_until(&self, job: &ScrapeJob, deadline: Option<Instant>) -> RetailerOutcome {
        let started = Instant::now();
        let retailer = job.retailer_name();
        let mut acc = Accumulator::new(job.max_brands());
        let mut pages_fetched = 0u32;
        let mut blocked = false;
        let mut visited = HashSet::from([job.start_url().to_owned()]);
        let mut url = job.start_url().to_owned();

        let (stop_reason, error) = loop {
            let page = match self.fetch_page(retailer, &url, deadline, &mut blocked).await {
                Ok(page) => page,
                Err(PageFailure::Fetch(err)) => {
                    tracing::warn!(retailer, url = %url, error = %err, "giving up on page");
                    break (StopReason::Failed, Some(err.kind()));
                }
                Err(PageFailure::Deadline) => {
                    tracing::warn!(
                        retailer,
                        url = %url,
                        pages_fetched,
                        "batch deadline reached mid-chain"
                    );
                    break (StopReason::Deadline, Some(ErrorKind::BatchTimeout));
                }
            };

            pages_fetched += 1;
            visited.insert(page.url.clone());
            let result = self
                .extractor
                .extract(&page.content, &page.url, pages_fetched);
            tracing::debug!(
                retailer,
                page = pages_fetched,
                found = result.brands.len(),
                "extracted page"
            );
            acc.merge(result.brands);

            if acc.is_full() {
                break (StopReason::BrandCapReached, None);
            }
            let Some(next) = result.next_url else {
                break (StopReason::NoNextPage, None);
            };
            if !visited.insert(next.clone()) {
                tracing::debug!(retailer, next = %next, "next link points at a visited page");
                break (StopReason::NoNextPage, None);
            }
            if pages_fetched >= self.max_pages {
                break (StopReason::PageLimitReached, None);
            }
            if !sleep_within(self.inter_page_delay, deadline).await {
                tracing::warn!(retailer, pages_fetched, "batch deadline reached between pages");
                break (StopReason::Deadline, Some(ErrorKind::BatchTimeout));
            }
            url = next;
        };

        RetailerOutcome {
            retailer_name: retailer.to_owned(),
            brands: acc.brands,
            pages_fetched,
            blocked,
            error,
            stop_reason,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Fetches and classifies one page, retrying per the retry policy.
    async fn fetch_page(
        &self,
        retailer: &str,
        url: &str,
        deadline: Option<Instant>,
        blocked: &mut bool,
    ) -> Result<FetchedPage, PageFailure> {
        let mut attempt = 1u32;
        loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(PageFailure::Deadline);
            }

            let err = match self
                .fetcher
                .fetch(url, &self.fetch_config)
                .await
                .and_then(check_page)
            {
                Ok(page) => return Ok(page),
                Err(err) => err,
            };
            if matches!(err, FetchError::Blocked { .. }) {
                *blocked = true;
            }

            let decision = self.retry.should_retry(attempt, &err);
            if !decision.retry {
                return Err(PageFailure::Fetch(err));
            }
            tracing::warn!(
                retailer,
                url,
                attempt,
                max_attempts = self.retry.max_attempts,
                delay_ms = u64::try_from(decision.delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient fetch error, retrying after backoff"
            );
            self.record_retry(retailer, attempt, &err).await;
            if !sleep_within(decision.delay, deadline).await {
                return Err(PageFailure::Deadline);
            }
            attempt += 1;
        }
    }

    /// Appends a retry line when a retry log is attached. Write failures are
    /// logged and otherwise ignored.
    async fn record_retry(&self, retailer: &str, attempt: u32, err: &FetchError) {
        let Some(log) = &self.retry_log else {
            return;
        };
        let retry = RetryRecord {
            timestamp: Utc::now(),
            source: retailer.to_owned(),
            attempt,
            reason: err.to_string(),
        };
        if let Err(e) = log.append_retry(&retry).await {
            tracing::warn!(retailer, error = %e, "failed to write retry record");
        }
    }
}

/// Sleeps for `delay`, or until `deadline` if that comes first. Returns
/// `false` when the deadline cut the sleep short.
async fn sleep_within(delay: Duration, deadline: Option<Instant>) -> bool {
    let wake = Instant::now() + delay;
    match deadline {
        Some(deadline) if deadline <= wake => {
            tokio::time::sleep_until(deadline).await;
            false
        }
        _ => {
            if !delay.is_zero() {
                tokio::time::sleep_until(wake).await;
            }
            true
        }
    }
}

#[cfg(test)]
#[path = "paginator_test.rs"]
mod tests;
