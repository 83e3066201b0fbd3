use anyhow::Result;
use tracing::{info, warn};

use analytics_application::commands::run_pipeline;
use analytics_infrastructure::AppConfig;

use crate::context::AppContext;

/// Runs one pipeline pass. Engine failures are reported but do not fail the run.
pub async fn run_standalone(config: AppConfig) -> Result<()> {
    info!(
        clickhouse = %config.clickhouse_url,
        table = %config.visits_table,
        output_dir = %config.output_dir,
        "visitscope starting"
    );
    let context = AppContext::new(&config)?;
    let manifest = run_pipeline(&context.state).await?;

    for failure in &manifest.failures {
        warn!(engine = %failure.engine, "no artifact produced: {}", failure.reason);
    }
    info!(
        run_id = %manifest.run_id,
        loaded = manifest.records_loaded,
        enriched = manifest.records_enriched,
        unique_ips = manifest.unique_ips,
        lookup_failures = manifest.metrics.geo_lookup_failures,
        artifacts = manifest.artifacts.len(),
        "run complete"
    );
    Ok(())
}
