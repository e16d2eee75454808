pub mod app_config;
pub mod config;
pub mod error;
pub mod job;
pub mod outcome;

pub use app_config::{AppConfig, Environment, LoadStrategy};
pub use config::{load_app_config, load_app_config_from_env, parse_environment, DEFAULT_USER_AGENT};
pub use error::{ConfigError, JobError};
pub use job::ScrapeJob;
pub use outcome::{BatchResult, ErrorKind, RetailerOutcome, StopReason};
