use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// A scrape job that cannot be scheduled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("retailer name is empty")]
    MissingName,

    #[error("brand list URL is missing for retailer \"{retailer}\"")]
    MissingUrl { retailer: String },

    #[error("brand list URL \"{url}\" for retailer \"{retailer}\" is not an absolute http(s) URL")]
    InvalidUrl { retailer: String, url: String },

    #[error("max_brands must be at least 1 for retailer \"{retailer}\"")]
    ZeroBrandCap { retailer: String },
}
