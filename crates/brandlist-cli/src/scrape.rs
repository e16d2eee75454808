//! `scrape` and `scrape-many` handlers.
//!
//! Results go to stdout as pretty JSON. Webhook delivery is best effort: a
//! failure is logged and the command still succeeds.

use std::time::Duration;

use brandlist_core::{AppConfig, BatchResult, Environment, ScrapeJob};
use brandlist_scraper::{HttpPageFetcher, Orchestrator, Paginator, WebhookClient};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator<HttpPageFetcher>> {
    let fetch_config = brandlist_scraper::FetchConfig::from_config(config);
    let fetcher = HttpPageFetcher::new(&fetch_config)
        .map_err(|e| anyhow::anyhow!("failed to build page fetcher: {e}"))?;
    Ok(Orchestrator::from_config(
        Paginator::from_config(fetcher, config),
        config,
    ))
}

pub(crate) async fn run_scrape(
    config: &AppConfig,
    job: &ScrapeJob,
    send_webhook: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let outcome = orchestrator.scrape_one(job).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if send_webhook {
        let batch = BatchResult {
            outcomes: vec![outcome],
            partial_timeout: false,
        };
        deliver(config, job.environment(), &batch).await;
    }
    Ok(())
}

pub(crate) async fn run_scrape_many(
    config: &AppConfig,
    jobs: Vec<ScrapeJob>,
    per_retailer_cap: Option<usize>,
    deadline: Option<Duration>,
    send_webhook: bool,
) -> anyhow::Result<()> {
    if jobs.is_empty() {
        anyhow::bail!("no retailers given; pass --retailer NAME=URL or --file");
    }
    let orchestrator = build_orchestrator(config)?;
    let batch = orchestrator
        .scrape_many(jobs, per_retailer_cap, deadline)
        .await?;
    println!("{}", serde_json::to_string_pretty(&batch)?);

    if send_webhook {
        deliver(config, config.env, &batch).await;
    }
    Ok(())
}

async fn deliver(config: &AppConfig, env: Environment, batch: &BatchResult) {
    let Some(url) = config.webhook_url_for(env) else {
        tracing::debug!(%env, "no webhook configured; skipping delivery");
        return;
    };
    let result = match WebhookClient::new(url, WEBHOOK_TIMEOUT) {
        Ok(client) => client.send_batch(batch).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(%env, error = %e, "webhook delivery failed");
    }
}
