//! Job lists for `scrape-many`: repeated `--retailer NAME=URL` flags or a
//! JSON jobs file.

use std::path::Path;

use brandlist_core::{AppConfig, ScrapeJob};
use serde::Deserialize;
use thiserror::Error;

/// One `--retailer NAME=URL` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetailerArg {
    pub(crate) name: String,
    pub(crate) url: String,
}

/// Splits `NAME=URL` at the first `=`; URLs may contain `=` themselves.
pub(crate) fn parse_retailer_arg(s: &str) -> Result<RetailerArg, String> {
    let (name, url) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=URL, got \"{s}\""))?;
    let (name, url) = (name.trim(), url.trim());
    if name.is_empty() || url.is_empty() {
        return Err(format!("expected NAME=URL, got \"{s}\""));
    }
    Ok(RetailerArg {
        name: name.to_owned(),
        url: url.to_owned(),
    })
}

pub(crate) fn jobs_from_args(retailers: Vec<RetailerArg>, config: &AppConfig) -> Vec<ScrapeJob> {
    retailers
        .into_iter()
        .map(|r| ScrapeJob::new(r.name, r.url, config.default_max_brands, config.env))
        .collect()
}

#[derive(Debug, Error)]
pub(crate) enum JobsFileError {
    #[error("failed to read jobs file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("jobs file is not a JSON array: {0}")]
    NotAnArray(#[source] serde_json::Error),

    #[error("invalid job at index {index}: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct JobsFileEntry {
    name: String,
    brand_list_url: String,
    #[serde(default)]
    max_brands: Option<usize>,
}

pub(crate) async fn load_jobs_file(
    path: &Path,
    config: &AppConfig,
) -> Result<Vec<ScrapeJob>, JobsFileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| JobsFileError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_jobs(&content, config)
}

/// Parses a jobs file. Entries without `max_brands` get the configured
/// default cap; every job runs in the process environment.
pub(crate) fn parse_jobs(content: &str, config: &AppConfig) -> Result<Vec<ScrapeJob>, JobsFileError> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(content).map_err(JobsFileError::NotAnArray)?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let entry: JobsFileEntry = serde_json::from_value(item)
                .map_err(|source| JobsFileError::InvalidItem { index, source })?;
            Ok(ScrapeJob::new(
                entry.name,
                entry.brand_list_url,
                entry.max_brands.unwrap_or(config.default_max_brands),
                config.env,
            ))
        })
        .collect()
}
