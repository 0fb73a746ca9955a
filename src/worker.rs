use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::HttpCapability;
use crate::error::{Error, Result};
use crate::job::JobSource;

/// Status recorded when a call produced no HTTP response at all.
pub const TRANSPORT_FAILURE: u16 = 0;

/// Result of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status_code: u16,
    pub duration: Duration,
}

impl Outcome {
    pub fn is_transport_failure(&self) -> bool {
        self.status_code == TRANSPORT_FAILURE
    }
}

/// Fixed set of workers, one per client instance.
pub struct WorkerPool<C> {
    clients: Vec<C>,
}

impl<C: HttpCapability> WorkerPool<C> {
    pub fn new(clients: Vec<C>) -> Result<Self> {
        if clients.is_empty() {
            return Err(Error::EmptyPool);
        }
        Ok(Self { clients })
    }

    pub fn concurrency(&self) -> usize {
        self.clients.len()
    }

    /// Drains `jobs` with every worker and waits for all of them to finish.
    ///
    /// The returned receiver is closed: it holds exactly one outcome per token
    /// and yields `None` once they have been read.
    pub async fn dispatch(self, url: &str, jobs: JobSource) -> Result<mpsc::Receiver<Outcome>> {
        let url: Arc<str> = Arc::from(url);
        let (results_tx, results_rx) = mpsc::channel(jobs.total().max(1));

        let handles: Vec<_> = self
            .clients
            .into_iter()
            .enumerate()
            .map(|(id, client)| {
                tokio::spawn(run_worker(
                    id,
                    client,
                    Arc::clone(&url),
                    jobs.clone(),
                    results_tx.clone(),
                ))
            })
            .collect();

        // Only worker-held senders remain, so the channel closes with the last worker.
        drop(results_tx);

        for (id, joined) in join_all(handles).await.into_iter().enumerate() {
            let completed = joined.map_err(|source| Error::Worker { id, source })?;
            debug!("Worker {} finished after {} requests", id, completed);
        }

        Ok(results_rx)
    }
}

async fn run_worker<C: HttpCapability>(
    id: usize,
    mut client: C,
    url: Arc<str>,
    jobs: JobSource,
    results: mpsc::Sender<Outcome>,
) -> usize {
    let mut completed = 0;

    while let Some(token) = jobs.next().await {
        let start = Instant::now();
        let status_code = match client.get(&url).await {
            Ok(status) => status,
            Err(e) => {
                debug!("Worker {} request {} failed: {}", id, token.0, e);
                TRANSPORT_FAILURE
            }
        };
        let duration = start.elapsed();

        debug!(
            "Worker {} request {} -> {} in {:?}",
            id, token.0, status_code, duration
        );

        if results
            .send(Outcome {
                status_code,
                duration,
            })
            .await
            .is_err()
        {
            warn!("Worker {} lost the outcome channel, stopping", id);
            break;
        }
        completed += 1;
    }

    completed
}
