//! Deterministic page fetcher and page builders for paginator and
//! orchestrator tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brandlist_core::{Environment, ScrapeJob};

use crate::error::FetchError;
use crate::fetcher::{FetchConfig, FetchedPage, PageFetcher};
use crate::retry::RetryPolicy;

type Scripted = Result<FetchedPage, FetchError>;

/// Fetcher that replays scripted results per URL.
///
/// Each URL has a queue; the last queued result repeats once the queue is
/// down to one entry. Unscripted URLs answer HTTP 404.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    script: Mutex<HashMap<String, VecDeque<Scripted>>>,
    latency: HashMap<String, Duration>,
    unavailable: Option<String>,
    calls: Mutex<Vec<String>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, url: &str, html: &str) -> Self {
        self.status(url, 200, html)
    }

    pub(crate) fn status(self, url: &str, status: u16, html: &str) -> Self {
        self.push(
            url,
            Ok(FetchedPage {
                url: url.to_owned(),
                status,
                content: html.to_owned(),
            }),
        )
    }

    pub(crate) fn fail(self, url: &str, err: FetchError) -> Self {
        self.push(url, Err(err))
    }

    pub(crate) fn latency(mut self, url: &str, latency: Duration) -> Self {
        self.latency.insert(url.to_owned(), latency);
        self
    }

    pub(crate) fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_owned());
        self
    }

    /// URLs fetched so far, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| *u == url).count()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push(mut self, url: &str, result: Scripted) -> Self {
        self.script
            .get_mut()
            .unwrap()
            .entry(url.to_owned())
            .or_default()
            .push_back(result);
        self
    }

    fn next_result(&self, url: &str) -> Scripted {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(FetchError::Http {
                url: url.to_owned(),
                status: 404,
            }),
        }
    }
}

impl PageFetcher for ScriptedFetcher {
    fn fetch(
        &self,
        url: &str,
        _config: &FetchConfig,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        self.calls.lock().unwrap().push(url.to_owned());
        let latency = self.latency.get(url).copied();
        let result = self.next_result(url);
        let in_flight = Arc::clone(&self.in_flight);
        let max_in_flight = Arc::clone(&self.max_in_flight);

        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn ensure_available(&self) -> impl Future<Output = Result<(), FetchError>> + Send {
        let result = match &self.unavailable {
            Some(reason) => Err(FetchError::Unavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        };
        async move { result }
    }
}

/// Markup of a brand-list page linking each brand under `/brands/` and,
/// optionally, a `rel="next"` link.
pub(crate) fn brand_page(brands: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body><main><ul>");
    for brand in brands {
        let slug = brand.to_lowercase().replace(' ', "-");
        html.push_str(&format!("<li><a href=\"/brands/{slug}\">{brand}</a></li>"));
    }
    html.push_str("</ul>");
    if let Some(next) = next {
        html.push_str(&format!("<a rel=\"next\" href=\"{next}\">Next</a>"));
    }
    html.push_str("</main></body></html>");
    html
}

pub(crate) fn job(name: &str, url: &str, max_brands: usize) -> ScrapeJob {
    ScrapeJob::new(name, url, max_brands, Environment::Sandbox)
}

pub(crate) fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_ms: 100,
        cap_ms: 1_000,
    }
}

pub(crate) fn fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_ms: 1_000,
        block_resources: true,
        load_strategy: brandlist_core::LoadStrategy::Full,
        user_agent: "brandlist-test".to_owned(),
        proxy: None,
    }
}

pub(crate) fn timeout(url: &str) -> FetchError {
    FetchError::Timeout {
        url: url.to_owned(),
    }
}
