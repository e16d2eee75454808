//! The page-fetch capability consumed by the paginator.
//!
//! Rendering engines (plain HTTP, headless browsers) plug in behind
//! [`PageFetcher`]; the rest of the crate only sees [`FetchedPage`] and
//! [`FetchError`].

use std::future::Future;
use std::sync::Arc;

use brandlist_core::{AppConfig, LoadStrategy};

use crate::error::FetchError;

/// Per-request fetch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    /// Skip images, fonts and media when the engine supports it.
    pub block_resources: bool,
    pub load_strategy: LoadStrategy,
    pub user_agent: String,
    pub proxy: Option<String>,
}

impl FetchConfig {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_ms: config.fetch_timeout_ms,
            block_resources: config.block_resources,
            load_strategy: config.load_strategy,
            user_agent: config.user_agent.clone(),
            proxy: config.proxy.clone(),
        }
    }
}

/// Raw page returned by a fetcher. Any status is returned as-is; block and
/// error detection happens in [`crate::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it.
    pub url: String,
    pub status: u16,
    pub content: String,
}

pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its rendered content.
    fn fetch(
        &self,
        url: &str,
        config: &FetchConfig,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;

    /// Checks that the fetcher can serve requests at all. Called once before
    /// a scrape is scheduled.
    fn ensure_available(&self) -> impl Future<Output = Result<(), FetchError>> + Send {
        async { Ok(()) }
    }
}

impl<T: PageFetcher> PageFetcher for Arc<T> {
    fn fetch(
        &self,
        url: &str,
        config: &FetchConfig,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        (**self).fetch(url, config)
    }

    fn ensure_available(&self) -> impl Future<Output = Result<(), FetchError>> + Send {
        (**self).ensure_available()
    }
}
