use anyhow::Result;
use clap::Parser;
use tracing::{error, warn};

use analytics_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "visitscope")]
#[command(about = "Batch visit analytics over the request log", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("VISITSCOPE_CONFIG", config);
    }

    let config = AppConfig::load().await?;
    let _log_guard = analytics_bootstrap::logging::init(&config)?;
    if let Some(path) = &config.missing_file {
        warn!("{} not found, using defaults", path.display());
    }

    if let Err(err) = analytics_bootstrap::run_standalone(config).await {
        error!("run aborted: {:#}", err);
        return Err(err);
    }
    Ok(())
}
