pub mod classify;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod paginator;
pub mod retry;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;

pub use classify::{check_page, classify, PageClass};
pub use error::{FetchError, ScraperError, WebhookError};
pub use extract::{extract_page, BrandExtractor, GenericExtractor, PageResult};
pub use fetcher::{FetchConfig, FetchedPage, PageFetcher};
pub use http::HttpPageFetcher;
pub use normalize::{dedupe_brand_names, normalize_brand_name};
pub use orchestrator::Orchestrator;
pub use paginator::Paginator;
pub use retry::{RetryDecision, RetryPolicy};
pub use webhook::{WebhookClient, WebhookPayload};
