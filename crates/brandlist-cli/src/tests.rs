use std::path::PathBuf;

use brandlist_core::{AppConfig, LoadStrategy};

use super::*;
use crate::jobs::{jobs_from_args, parse_jobs, parse_retailer_arg, JobsFileError};

fn test_config(env: Environment) -> AppConfig {
    AppConfig {
        env,
        log_level: "info".to_owned(),
        log_dir: PathBuf::from("./logs"),
        concurrency_limit: 3,
        chunk_size: 200,
        max_pages: 10,
        max_attempts: 3,
        retry_base_ms: 1_000,
        retry_cap_ms: 8_000,
        default_max_brands: 500,
        batch_deadline_secs: 115,
        fetch_timeout_ms: 60_000,
        inter_page_delay_ms: 250,
        load_strategy: LoadStrategy::Full,
        block_resources: true,
        user_agent: brandlist_core::DEFAULT_USER_AGENT.to_owned(),
        proxy: None,
        webhook_url_production: None,
        webhook_url_sandbox: None,
    }
}

// -----------------------------------------------------------------------
// Argument parsing
// -----------------------------------------------------------------------

#[test]
fn parses_scrape_command() {
    let cli = Cli::try_parse_from([
        "brandlist",
        "scrape",
        "--name",
        "Beymen",
        "--url",
        "https://www.beymen.com/markalar",
        "--max-brands",
        "25",
        "--env",
        "sandbox",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Scrape {
            max_brands: Some(25),
            env: Some(Environment::Sandbox),
            no_webhook: false,
            ..
        }
    ));
}

#[test]
fn scrape_rejects_unknown_environment() {
    let result = Cli::try_parse_from([
        "brandlist", "scrape", "--name", "X", "--url", "https://x.test", "--env", "staging",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_scrape_many_with_repeated_retailers() {
    let cli = Cli::try_parse_from([
        "brandlist",
        "scrape-many",
        "--retailer",
        "Beymen=https://www.beymen.com/markalar",
        "--retailer",
        "Vakko=https://www.vakko.com/markalar?sort=a=z",
        "--max-brands-per-retailer",
        "40",
        "--no-webhook",
    ])
    .expect("expected valid cli args");

    let Commands::ScrapeMany {
        retailers,
        file,
        max_brands_per_retailer,
        no_webhook,
        ..
    } = cli.command
    else {
        panic!("expected scrape-many");
    };
    assert_eq!(retailers.len(), 2);
    assert_eq!(retailers[1].url, "https://www.vakko.com/markalar?sort=a=z");
    assert!(file.is_none());
    assert_eq!(max_brands_per_retailer, Some(40));
    assert!(no_webhook);
}

#[test]
fn scrape_many_requires_retailers_or_file() {
    assert!(Cli::try_parse_from(["brandlist", "scrape-many"]).is_err());
    assert!(Cli::try_parse_from(["brandlist", "scrape-many", "--file", "jobs.json"]).is_ok());
}

#[test]
fn scrape_many_rejects_both_retailers_and_file() {
    let result = Cli::try_parse_from([
        "brandlist",
        "scrape-many",
        "--retailer",
        "A=https://a.test",
        "--file",
        "jobs.json",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_report_with_window() {
    let cli = Cli::try_parse_from(["brandlist", "report", "--days", "7"]).unwrap();
    assert!(matches!(cli.command, Commands::Report { days: Some(7) }));
}

// -----------------------------------------------------------------------
// Job lists
// -----------------------------------------------------------------------

#[test]
fn retailer_arg_splits_at_first_equals() {
    let arg = parse_retailer_arg(" Beymen = https://x.test/?a=b ").unwrap();
    assert_eq!(arg.name, "Beymen");
    assert_eq!(arg.url, "https://x.test/?a=b");
}

#[test]
fn retailer_arg_requires_name_and_url() {
    assert!(parse_retailer_arg("Beymen").is_err());
    assert!(parse_retailer_arg("=https://x.test").is_err());
    assert!(parse_retailer_arg("Beymen=").is_err());
}

#[test]
fn jobs_from_args_use_configured_cap_and_env() {
    let config = test_config(Environment::Sandbox);
    let jobs = jobs_from_args(
        vec![parse_retailer_arg("Beymen=https://x.test").unwrap()],
        &config,
    );
    assert_eq!(jobs[0].max_brands(), 500);
    assert_eq!(jobs[0].environment(), Environment::Sandbox);
}

#[test]
fn jobs_file_entries_default_their_cap() {
    let config = test_config(Environment::Production);
    let jobs = parse_jobs(
        r#"[
            {"name": "Beymen", "brand_list_url": "https://www.beymen.com/markalar", "max_brands": 20},
            {"name": "Vakko", "brand_list_url": "https://www.vakko.com/markalar"}
        ]"#,
        &config,
    )
    .unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].retailer_name(), "Beymen");
    assert_eq!(jobs[0].max_brands(), 20);
    assert_eq!(jobs[1].max_brands(), 500);
    assert_eq!(jobs[1].environment(), Environment::Production);
}

#[test]
fn malformed_jobs_file_item_names_its_index() {
    let config = test_config(Environment::Production);
    let err = parse_jobs(
        r#"[
            {"name": "Beymen", "brand_list_url": "https://www.beymen.com/markalar"},
            {"name": "Vakko"}
        ]"#,
        &config,
    )
    .unwrap_err();

    assert!(matches!(err, JobsFileError::InvalidItem { index: 1, .. }));
}

#[test]
fn jobs_file_must_be_an_array() {
    let config = test_config(Environment::Production);
    let err = parse_jobs(r#"{"name": "Beymen"}"#, &config).unwrap_err();
    assert!(matches!(err, JobsFileError::NotAnArray(_)));
}
