use anyhow::Result;
use tracing::info;

use sam_awardee_collector::{collector, config::Config, logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();

    match std::env::args().nth(1).as_deref() {
        Some("serve") => server::serve(config).await?,
        _ => {
            let report = collector::run(&config.collector).await?;
            info!(
                "found {} unique awardees across {} jurisdictions",
                report.summary.total_unique_awardees, report.summary.jurisdictions_processed
            );
        }
    }

    Ok(())
}
