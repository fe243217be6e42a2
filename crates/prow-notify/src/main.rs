mod bootstrap_helpers;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use prow_cli::Cli;
use prow_fetch::HttpTextFetcher;
use prow_notify::{run_notify_pipeline, PipelineConfig};

use crate::bootstrap_helpers::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = PipelineConfig::from_cli(&cli)?;
    let fetcher = HttpTextFetcher::new(config.request_timeout_ms)?;
    let outcome = run_notify_pipeline(&config, &fetcher, Utc::now().date_naive()).await?;
    println!("{}", outcome.status_line()?);
    Ok(())
}
