use std::collections::BTreeMap;
use std::time::Duration;

use hdrhistogram::Histogram;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

use crate::error::Result;
use crate::worker::{Outcome, TRANSPORT_FAILURE};

/// Highest latency the histogram tracks exactly, in microseconds (one hour).
const HISTOGRAM_MAX_MICROS: u64 = 3_600_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub avg: Duration,
    pub max: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

/// Final statistics for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub total_elapsed: Duration,
    pub total_requests: usize,
    pub status_counts: BTreeMap<u16, usize>,
    /// `None` when no request was made.
    pub latency: Option<LatencySummary>,
}

impl Report {
    pub fn count(&self, status: u16) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    pub fn transport_failures(&self) -> usize {
        self.count(TRANSPORT_FAILURE)
    }

    pub fn print_summary(&self) {
        info!("╔════════════════════════════════════════════════════════════╗");
        info!("║                      LOAD TEST REPORT                      ║");
        info!("╚════════════════════════════════════════════════════════════╝");

        info!("");
        info!("  Total Time:          {:.2?}", self.total_elapsed);
        info!("  Total Requests:      {}", self.total_requests);
        info!("  HTTP 200:            {}", self.count(200));

        let others: Vec<_> = self
            .status_counts
            .iter()
            .filter(|(code, _)| **code != 200)
            .collect();
        if !others.is_empty() {
            info!("");
            info!("Other Status Codes:");
            for (code, count) in others {
                if *code == TRANSPORT_FAILURE {
                    info!("  Transport failure:   {}", count);
                } else {
                    info!("  HTTP {}:            {}", code, count);
                }
            }
        }

        info!("");
        info!("Latency:");
        match &self.latency {
            Some(latency) => {
                info!("  Min:    {:.2?}", latency.min);
                info!("  Mean:   {:.2?}", latency.avg);
                info!("  p50:    {:.2?}", latency.p50);
                info!("  p95:    {:.2?}", latency.p95);
                info!("  p99:    {:.2?}", latency.p99);
                info!("  Max:    {:.2?}", latency.max);
            }
            None => info!("  No data"),
        }

        info!("");
        info!("═══════════════════════════════════════════════════════════");
    }
}

/// Single-pass reduction of outcomes into a [`Report`].
pub struct Aggregator {
    status_counts: BTreeMap<u16, usize>,
    count: usize,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
    histogram: Histogram<u64>,
}

impl Aggregator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            status_counts: BTreeMap::new(),
            count: 0,
            total: Duration::ZERO,
            min: None,
            max: None,
            histogram: Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_MICROS, 3)?,
        })
    }

    pub fn record(&mut self, outcome: &Outcome) {
        *self.status_counts.entry(outcome.status_code).or_insert(0) += 1;
        self.count += 1;
        self.total += outcome.duration;

        self.min = Some(self.min.map_or(outcome.duration, |m| m.min(outcome.duration)));
        self.max = Some(self.max.map_or(outcome.duration, |m| m.max(outcome.duration)));

        let micros = u64::try_from(outcome.duration.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
    }

    pub fn finish(self, total_elapsed: Duration) -> Report {
        let latency = match (self.min, self.max) {
            (Some(min), Some(max)) => {
                let avg_nanos = self.total.as_nanos() / self.count as u128;
                let avg = Duration::from_nanos(avg_nanos as u64);
                // histogram buckets are coarser than the exact min/max
                let quantile = |q: f64| {
                    Duration::from_micros(self.histogram.value_at_quantile(q)).clamp(min, max)
                };

                Some(LatencySummary {
                    min,
                    avg,
                    max,
                    p50: quantile(0.50),
                    p95: quantile(0.95),
                    p99: quantile(0.99),
                })
            }
            _ => None,
        };

        Report {
            total_elapsed,
            total_requests: self.count,
            status_counts: self.status_counts,
            latency,
        }
    }

    /// Reads a closed outcome channel to the end and builds the report.
    ///
    /// `started` marks the beginning of the whole run; elapsed time is taken
    /// once every outcome has been reduced.
    pub async fn collect(
        mut self,
        mut outcomes: mpsc::Receiver<Outcome>,
        started: Instant,
    ) -> Report {
        while let Some(outcome) = outcomes.recv().await {
            self.record(&outcome);
        }
        self.finish(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status_code: u16, millis: u64) -> Outcome {
        Outcome {
            status_code,
            duration: Duration::from_millis(millis),
        }
    }

    fn aggregate(outcomes: &[Outcome]) -> Report {
        let mut aggregator = Aggregator::new().unwrap();
        for o in outcomes {
            aggregator.record(o);
        }
        aggregator.finish(Duration::from_secs(1))
    }

    #[test]
    fn test_counts_and_latency() {
        let outcomes = [
            outcome(200, 10),
            outcome(200, 30),
            outcome(404, 20),
            outcome(TRANSPORT_FAILURE, 40),
        ];
        let report = aggregate(&outcomes);

        assert_eq!(report.total_requests, 4);
        assert_eq!(report.count(200), 2);
        assert_eq!(report.count(404), 1);
        assert_eq!(report.transport_failures(), 1);
        assert_eq!(report.count(500), 0);
        assert_eq!(report.status_counts.values().sum::<usize>(), 4);

        let latency = report.latency.unwrap();
        assert_eq!(latency.min, Duration::from_millis(10));
        assert_eq!(latency.max, Duration::from_millis(40));
        assert_eq!(latency.avg, Duration::from_millis(25));
        for o in &outcomes {
            assert!(latency.min <= o.duration && o.duration <= latency.max);
        }
    }

    #[test]
    fn test_order_does_not_matter() {
        let mut outcomes: Vec<_> = (1..=50).map(|i| outcome(200 + (i % 3) as u16, i)).collect();
        let forward = aggregate(&outcomes);
        outcomes.reverse();
        let backward = aggregate(&outcomes);

        assert_eq!(forward.status_counts, backward.status_counts);
        assert_eq!(forward.latency, backward.latency);
    }

    #[test]
    fn test_percentiles() {
        let mut outcomes = Vec::new();
        outcomes.extend((0..90).map(|_| outcome(200, 10)));
        outcomes.extend((0..10).map(|_| outcome(200, 100)));
        let latency = aggregate(&outcomes).latency.unwrap();

        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        assert!((ms(latency.p50) - 10.0).abs() < 0.1, "p50: {:?}", latency.p50);
        assert!((ms(latency.p99) - 100.0).abs() < 1.0, "p99: {:?}", latency.p99);
        assert!(latency.p50 <= latency.p95 && latency.p95 <= latency.p99);
    }

    #[test]
    fn test_percentiles_stay_within_min_max() {
        let outcomes: Vec<_> = (0..20).map(|_| outcome(200, 0)).collect();
        let latency = aggregate(&outcomes).latency.unwrap();

        assert_eq!(latency.min, Duration::ZERO);
        assert_eq!(latency.max, Duration::ZERO);
        assert_eq!(latency.p50, Duration::ZERO);
        assert_eq!(latency.p99, Duration::ZERO);

        let outcomes = [outcome(200, 7), outcome(200, 7), outcome(200, 7)];
        let latency = aggregate(&outcomes).latency.unwrap();
        for p in [latency.p50, latency.p95, latency.p99] {
            assert_eq!(p, Duration::from_millis(7));
        }
    }

    #[test]
    fn test_no_outcomes_has_no_latency() {
        let report = aggregate(&[]);

        assert_eq!(report.total_requests, 0);
        assert!(report.status_counts.is_empty());
        assert!(report.latency.is_none());
        report.print_summary();
    }

    #[tokio::test]
    async fn test_collect_drains_closed_channel() {
        let (tx, rx) = mpsc::channel(3);
        for millis in [5, 15, 10] {
            tx.send(outcome(503, millis)).await.unwrap();
        }
        drop(tx);

        let report = Aggregator::new().unwrap().collect(rx, Instant::now()).await;

        assert_eq!(report.count(503), 3);
        assert_eq!(report.latency.unwrap().avg, Duration::from_millis(10));
    }
}
