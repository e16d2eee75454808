use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Deployment target of a scrape. Selects config defaults and the webhook
/// that receives results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Sandbox,
    #[default]
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How long the fetcher waits for a page before handing back its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Wait for the full document load.
    #[default]
    Full,
    /// Return as soon as the DOM is available.
    Fast,
}

impl std::fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStrategy::Full => write!(f, "full"),
            LoadStrategy::Fast => write!(f, "fast"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub concurrency_limit: usize,
    pub chunk_size: usize,
    pub max_pages: u32,
    pub max_attempts: u32,
    pub retry_base_ms: u64,
    pub retry_cap_ms: u64,
    pub default_max_brands: usize,
    pub batch_deadline_secs: u64,
    pub fetch_timeout_ms: u64,
    pub inter_page_delay_ms: u64,
    pub load_strategy: LoadStrategy,
    pub block_resources: bool,
    pub user_agent: String,
    pub proxy: Option<String>,
    pub webhook_url_production: Option<String>,
    pub webhook_url_sandbox: Option<String>,
}

impl AppConfig {
    /// Webhook target for results scraped in `env`, if one is configured.
    #[must_use]
    pub fn webhook_url_for(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Production => self.webhook_url_production.as_deref(),
            Environment::Sandbox => self.webhook_url_sandbox.as_deref(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .field("concurrency_limit", &self.concurrency_limit)
            .field("chunk_size", &self.chunk_size)
            .field("max_pages", &self.max_pages)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_ms", &self.retry_base_ms)
            .field("retry_cap_ms", &self.retry_cap_ms)
            .field("default_max_brands", &self.default_max_brands)
            .field("batch_deadline_secs", &self.batch_deadline_secs)
            .field("fetch_timeout_ms", &self.fetch_timeout_ms)
            .field("inter_page_delay_ms", &self.inter_page_delay_ms)
            .field("load_strategy", &self.load_strategy)
            .field("block_resources", &self.block_resources)
            .field("user_agent", &self.user_agent)
            .field("proxy", &self.proxy.as_ref().map(|_| "[redacted]"))
            .field(
                "webhook_url_production",
                &self.webhook_url_production.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "webhook_url_sandbox",
                &self.webhook_url_sandbox.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
