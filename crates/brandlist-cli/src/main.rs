mod jobs;
mod report;
mod scrape;

use std::path::PathBuf;

use brandlist_core::Environment;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::jobs::RetailerArg;

#[derive(Debug, Parser)]
#[command(name = "brandlist")]
#[command(about = "Scrape retailer brand lists and report scrape reliability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one retailer's brand list.
    Scrape {
        /// Retailer name recorded on the outcome and in the reliability log.
        #[arg(long)]
        name: String,
        /// Brand-list page to start from.
        #[arg(long)]
        url: String,
        /// Brand cap; defaults to the environment's configured cap.
        #[arg(long)]
        max_brands: Option<usize>,
        /// `production` or `sandbox`; defaults to `BRANDLIST_ENV`.
        #[arg(long, value_parser = brandlist_core::parse_environment)]
        env: Option<Environment>,
        /// Skip webhook delivery.
        #[arg(long)]
        no_webhook: bool,
    },
    /// Scrape many retailers concurrently.
    ScrapeMany {
        /// `NAME=URL`; repeat for each retailer.
        #[arg(
            long = "retailer",
            value_parser = jobs::parse_retailer_arg,
            required_unless_present = "file",
            conflicts_with = "file"
        )]
        retailers: Vec<RetailerArg>,
        /// JSON array of `{ "name", "brand_list_url", "max_brands"? }`.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Replaces every job's own brand cap.
        #[arg(long)]
        max_brands_per_retailer: Option<usize>,
        /// Batch deadline; defaults to `BRANDLIST_BATCH_DEADLINE_SECS`.
        #[arg(long)]
        deadline_secs: Option<u64>,
        #[arg(long)]
        no_webhook: bool,
    },
    /// Summarize the reliability log per retailer.
    Report {
        /// Only include the trailing N days.
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = brandlist_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape {
            name,
            url,
            max_brands,
            env,
            no_webhook,
        } => {
            let env = env.unwrap_or(config.env);
            let job = brandlist_core::ScrapeJob::new(
                name,
                url,
                max_brands.unwrap_or(config.default_max_brands),
                env,
            );
            scrape::run_scrape(&config, &job, !no_webhook).await?;
        }
        Commands::ScrapeMany {
            retailers,
            file,
            max_brands_per_retailer,
            deadline_secs,
            no_webhook,
        } => {
            let jobs = match file {
                Some(path) => jobs::load_jobs_file(&path, &config).await?,
                None => jobs::jobs_from_args(retailers, &config),
            };
            scrape::run_scrape_many(
                &config,
                jobs,
                max_brands_per_retailer,
                deadline_secs.map(std::time::Duration::from_secs),
                !no_webhook,
            )
            .await?;
        }
        Commands::Report { days } => report::run_report(&config, days).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
