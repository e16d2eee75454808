use crate::app_config::{AppConfig, Environment, LoadStrategy};
use crate::ConfigError;

/// Desktop browser user agent; many retailer storefronts answer 403 to
/// default client agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Per-environment defaults applied when the matching variable is unset.
struct EnvDefaults {
    max_pages: &'static str,
    default_max_brands: &'static str,
    fetch_timeout_ms: &'static str,
    inter_page_delay_ms: &'static str,
}

fn env_defaults(env: Environment) -> EnvDefaults {
    match env {
        Environment::Production => EnvDefaults {
            max_pages: "10",
            default_max_brands: "500",
            fetch_timeout_ms: "60000",
            inter_page_delay_ms: "250",
        },
        Environment::Sandbox => EnvDefaults {
            max_pages: "3",
            default_max_brands: "50",
            fetch_timeout_ms: "25000",
            inter_page_delay_ms: "0",
        },
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_nonzero_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("BRANDLIST_ENV", "production"))?;
    let defaults = env_defaults(env);

    let log_level = or_default("BRANDLIST_LOG_LEVEL", "info");
    let log_dir = PathBuf::from(or_default("BRANDLIST_LOG_DIR", "./logs"));

    let concurrency_limit = parse_nonzero_usize("BRANDLIST_CONCURRENCY_LIMIT", "3")?;
    let chunk_size = parse_nonzero_usize("BRANDLIST_CHUNK_SIZE", "200")?;
    let max_pages = parse_u32("BRANDLIST_MAX_PAGES", defaults.max_pages)?;
    let max_attempts = parse_u32("BRANDLIST_MAX_ATTEMPTS", "3")?;
    let retry_base_ms = parse_u64("BRANDLIST_RETRY_BASE_MS", "1000")?;
    let retry_cap_ms = parse_u64("BRANDLIST_RETRY_CAP_MS", "8000")?;
    let default_max_brands =
        parse_nonzero_usize("BRANDLIST_DEFAULT_MAX_BRANDS", defaults.default_max_brands)?;
    let batch_deadline_secs = parse_u64("BRANDLIST_BATCH_DEADLINE_SECS", "115")?;
    let fetch_timeout_ms = parse_u64("BRANDLIST_FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms)?;
    let inter_page_delay_ms =
        parse_u64("BRANDLIST_INTER_PAGE_DELAY_MS", defaults.inter_page_delay_ms)?;
    let load_strategy = parse_load_strategy(&or_default("BRANDLIST_LOAD_STRATEGY", "full"))?;
    let block_resources = parse_bool("BRANDLIST_BLOCK_RESOURCES", "true")?;
    let user_agent = or_default("BRANDLIST_USER_AGENT", DEFAULT_USER_AGENT);
    let proxy = optional("BRANDLIST_PROXY");
    let webhook_url_production = optional("BRANDLIST_WEBHOOK_URL_PRODUCTION");
    let webhook_url_sandbox = optional("BRANDLIST_WEBHOOK_URL_SANDBOX");

    if max_pages == 0 {
        return Err(invalid(
            "BRANDLIST_MAX_PAGES",
            "must be greater than zero".to_string(),
        ));
    }
    if max_attempts == 0 {
        return Err(invalid(
            "BRANDLIST_MAX_ATTEMPTS",
            "must be greater than zero".to_string(),
        ));
    }
    if retry_cap_ms < retry_base_ms {
        return Err(invalid(
            "BRANDLIST_RETRY_CAP_MS",
            format!("cap {retry_cap_ms}ms is below base {retry_base_ms}ms"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        log_dir,
        concurrency_limit,
        chunk_size,
        max_pages,
        max_attempts,
        retry_base_ms,
        retry_cap_ms,
        default_max_brands,
        batch_deadline_secs,
        fetch_timeout_ms,
        inter_page_delay_ms,
        load_strategy,
        block_resources,
        user_agent,
        proxy,
        webhook_url_production,
        webhook_url_sandbox,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than `sandbox` or
/// `production`.
pub fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "production" => Ok(Environment::Production),
        "sandbox" => Ok(Environment::Sandbox),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDLIST_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_load_strategy(s: &str) -> Result<LoadStrategy, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "full" => Ok(LoadStrategy::Full),
        "fast" => Ok(LoadStrategy::Fast),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDLIST_LOAD_STRATEGY".to_string(),
            reason: format!("unknown load strategy \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
