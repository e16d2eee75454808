//! Scrape job definition and validation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::Environment;
use crate::error::JobError;

/// One retailer brand-list scrape request.
///
/// Fields are private so a job cannot change after construction; use
/// [`ScrapeJob::with_max_brands`] to derive a job with a different cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeJob {
    retailer_name: String,
    start_url: String,
    max_brands: usize,
    environment: Environment,
}

impl ScrapeJob {
    /// Builds a job, trimming the name and URL.
    ///
    /// The job is not validated here; [`ScrapeJob::validate`] runs before
    /// scheduling so that a batch can report the offending index.
    #[must_use]
    pub fn new(
        retailer_name: impl Into<String>,
        start_url: impl Into<String>,
        max_brands: usize,
        environment: Environment,
    ) -> Self {
        Self {
            retailer_name: retailer_name.into().trim().to_owned(),
            start_url: start_url.into().trim().to_owned(),
            max_brands,
            environment,
        }
    }

    #[must_use]
    pub fn retailer_name(&self) -> &str {
        &self.retailer_name
    }

    #[must_use]
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    #[must_use]
    pub fn max_brands(&self) -> usize {
        self.max_brands
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns a copy of this job with its brand cap replaced.
    #[must_use]
    pub fn with_max_brands(&self, max_brands: usize) -> Self {
        Self {
            max_brands,
            ..self.clone()
        }
    }

    /// Checks that the job can be scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] when the name is blank, the URL is missing or a
    /// placeholder (`n/a`), the URL is not absolute http(s), or the brand cap
    /// is zero.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.retailer_name.is_empty() {
            return Err(JobError::MissingName);
        }
        if is_placeholder_url(&self.start_url) {
            return Err(JobError::MissingUrl {
                retailer: self.retailer_name.clone(),
            });
        }
        if !is_absolute_http_url(&self.start_url) {
            return Err(JobError::InvalidUrl {
                retailer: self.retailer_name.clone(),
                url: self.start_url.clone(),
            });
        }
        if self.max_brands == 0 {
            return Err(JobError::ZeroBrandCap {
                retailer: self.retailer_name.clone(),
            });
        }
        Ok(())
    }
}

/// Retailer sheets mark missing brand pages as `N/A`, sometimes with a scheme
/// glued on.
fn is_placeholder_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.is_empty()
        || lower == "n/a"
        || lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .is_some_and(|rest| rest.starts_with("n/a"))
}

fn is_absolute_http_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}
