//! Fixed-size HTTP GET load generator.
//!
//! A [`JobSource`] is filled with one token per request, a [`WorkerPool`]
//! drains it with one HTTP client per worker, and an [`Aggregator`] reduces the
//! resulting outcomes into a [`Report`] once every worker has finished.

pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod report;
pub mod worker;

pub use client::{HttpCapability, ReqwestClient};
pub use config::Config;
pub use error::{ConfigError, Error, Result, TransportError};
pub use job::{JobSource, WorkToken};
pub use report::{Aggregator, LatencySummary, Report};
pub use worker::{Outcome, WorkerPool, TRANSPORT_FAILURE};

use tokio::time::Instant;
use tracing::{info, warn};

/// Validates `config`, builds one `reqwest` client per worker and runs the test.
pub async fn run(config: &Config) -> Result<Report> {
    let url = config.validate()?;

    info!("Target: {}", url);
    info!("Requests: {}", config.requests);
    info!("Concurrency: {}", config.concurrency);
    if let Some(timeout) = config.timeout() {
        info!("Request timeout: {:?}", timeout);
    }
    if config.concurrency > config.requests {
        warn!(
            "Concurrency {} exceeds request count {}, some workers will stay idle",
            config.concurrency, config.requests
        );
    }

    let clients = (0..config.concurrency)
        .map(|_| ReqwestClient::new(config.timeout()))
        .collect::<Result<Vec<_>>>()?;

    execute(url.as_str(), config.requests, clients).await
}

/// Sends `total_requests` GETs to `url`, one worker per client, and aggregates the outcomes.
pub async fn execute<C: HttpCapability>(
    url: &str,
    total_requests: usize,
    clients: Vec<C>,
) -> Result<Report> {
    let started = Instant::now();

    let pool = WorkerPool::new(clients)?;
    let aggregator = Aggregator::new()?;
    let jobs = JobSource::filled(total_requests);

    info!(
        "Dispatching {} requests across {} workers",
        total_requests,
        pool.concurrency()
    );

    let outcomes = pool.dispatch(url, jobs).await?;
    let report = aggregator.collect(outcomes, started).await;

    info!(
        "Completed {} requests in {:.2?}",
        report.total_requests, report.total_elapsed
    );

    Ok(report)
}
