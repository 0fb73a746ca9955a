use anyhow::Result;
use barrage::{Config, Error};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("════════════════════════════════════════════════════════════");
    info!("                 HTTP BARRAGE LOAD TEST");
    info!("════════════════════════════════════════════════════════════");

    let report = match barrage::run(&config).await {
        Ok(report) => report,
        Err(Error::Config(e)) => {
            error!("{}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    report.print_summary();

    info!("════════════════════════════════════════════════════════════");
    info!("                    LOAD TEST COMPLETE");
    info!("════════════════════════════════════════════════════════════");

    Ok(())
}
