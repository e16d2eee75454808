use brandlist_core::AppConfig;
use brandlist_reliability::ReliabilityLog;

/// Prints the per-retailer reliability report for the configured log
/// directory.
pub(crate) async fn run_report(config: &AppConfig, days: Option<u32>) -> anyhow::Result<()> {
    let log = ReliabilityLog::new(&config.log_dir);
    let report = brandlist_reliability::report(&log, days).await?;
    if report.log_files.is_empty() {
        tracing::info!(dir = %config.log_dir.display(), "no reliability logs found");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
