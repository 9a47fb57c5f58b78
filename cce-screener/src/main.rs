//! CCE Screener - run one covered-call scan and export the result.

use anyhow::{Context, Result};
use chrono::Utc;

use cce_common::config::Config;
use cce_common::logging::init_logging;
use cce_screener::session::{ScanOutcome, ScanSession};

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load()?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("CCE Screener v{}", env!("CARGO_PKG_VERSION"));

    let mut session = ScanSession::from_config(&config);
    session.reset_filters();

    tracing::info!(
        duration_ms = startup_start.elapsed().as_millis() as u64,
        backend = %config.api.base_url,
        "Session initialized"
    );

    let outcome = session
        .scan(false)
        .await
        .context("Covered-call scan failed")?;

    // A single sequential scan cannot be superseded
    let ScanOutcome::Applied(summary) = outcome else {
        return Ok(());
    };

    tracing::info!(
        received = summary.total_received,
        kept = summary.kept,
        from_cache = summary.from_cache,
        market_closed = summary.market_closed,
        "Scan complete"
    );

    let report_path = config
        .report
        .resolved_dir()
        .join(format!("scan_{}.csv", Utc::now().format("%Y%m%d_%H%M%S")));
    let written = session
        .write_csv(&report_path)
        .context("Failed to write scan export")?;

    tracing::info!(path = %written.display(), rows = summary.kept, "Export written");
    Ok(())
}
