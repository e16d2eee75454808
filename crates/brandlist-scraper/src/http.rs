//! reqwest-backed [`PageFetcher`] for server-rendered brand pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::{FetchError, ScraperError};
use crate::fetcher::{FetchConfig, FetchedPage, PageFetcher};

/// Plain HTTP page fetcher.
///
/// It never loads sub-resources or runs scripts, so `block_resources` and
/// `load_strategy` are already satisfied. The proxy is bound when the client
/// is built; a different proxy on a later request is ignored.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Builds the underlying client with the configured timeout, user agent
    /// and proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the proxy URL is invalid or the
    /// `reqwest::Client` cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<FetchedPage, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }
        let referer = extract_origin(&parsed);

        let response = self
            .client
            .get(parsed)
            .timeout(Duration::from_millis(config.timeout_ms))
            .header(reqwest::header::USER_AGENT, &config.user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, referer)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content = response
            .text()
            .await
            .map_err(|e| transport_error(url, &e))?;

        tracing::debug!(url, status, bytes = content.len(), "fetched page");

        Ok(FetchedPage {
            url: final_url,
            status,
            content,
        })
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_owned(),
        }
    } else {
        FetchError::Network {
            url: url.to_owned(),
            message: err.to_string(),
        }
    }
}

/// Scheme+host origin of a page, sent as `Referer` so the request looks like
/// in-site navigation.
fn extract_origin(url: &reqwest::Url) -> String {
    url.origin().ascii_serialization()
}
