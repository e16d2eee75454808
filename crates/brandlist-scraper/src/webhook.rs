//! Delivery of batch results to a downstream automation webhook.

use std::time::Duration;

use brandlist_core::BatchResult;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::error::WebhookError;

/// Longest response body kept on a [`WebhookError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub records: Vec<BrandRecord>,
    pub results_by_retailer: Vec<RetailerSummary>,
    pub meta: PayloadMeta,
}

/// One row per brand found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandRecord {
    pub brand: String,
    pub source: String,
    pub scrape_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetailerSummary {
    pub retailer: String,
    pub brands_count: usize,
    pub pages_fetched: u32,
    pub blocked: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadMeta {
    pub count: usize,
    pub scrape_timestamp: String,
    pub partial_timeout: bool,
}

impl WebhookPayload {
    /// Flattens a batch into the webhook's record/summary shape, stamping
    /// every record with `scraped_at`.
    #[must_use]
    pub fn from_batch(batch: &BatchResult, scraped_at: DateTime<Utc>) -> Self {
        let timestamp = scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let records: Vec<BrandRecord> = batch
            .outcomes
            .iter()
            .flat_map(|outcome| {
                outcome.brands.iter().map(|brand| BrandRecord {
                    brand: brand.clone(),
                    source: outcome.retailer_name.clone(),
                    scrape_timestamp: timestamp.clone(),
                })
            })
            .collect();

        let results_by_retailer = batch
            .outcomes
            .iter()
            .map(|outcome| RetailerSummary {
                retailer: outcome.retailer_name.clone(),
                brands_count: outcome.brands.len(),
                pages_fetched: outcome.pages_fetched,
                blocked: outcome.blocked,
                error: outcome.error.as_ref().map(ToString::to_string),
            })
            .collect();

        Self {
            meta: PayloadMeta {
                count: records.len(),
                scrape_timestamp: timestamp,
                partial_timeout: batch.partial_timeout,
            },
            records,
            results_by_retailer,
        }
    }
}

/// Posts batch payloads to one webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    /// # Errors
    ///
    /// Returns [`WebhookError::Http`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Sends `batch` as a JSON payload.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::Http`] on transport failure.
    /// - [`WebhookError::UnexpectedStatus`] on a non-2xx response.
    pub async fn send_batch(&self, batch: &BatchResult) -> Result<(), WebhookError> {
        let payload = WebhookPayload::from_batch(batch, Utc::now());
        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        tracing::info!(
            records = payload.meta.count,
            retailers = payload.results_by_retailer.len(),
            "webhook delivered"
        );
        Ok(())
    }
}
