//! Periodic sampling task.
//!
//! Every cycle reads each metric from the provider, appends the readings to the
//! retention store under one shared timestamp and prunes expired samples.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use super::history::{CycleBatch, PruneStats, RetentionStore};
use super::metrics::{ProcessSample, ResourceKind, ResourceReading, ResourceSample};
use super::provider::MetricsProvider;
use crate::error::Result;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(60);

/// What one sampling cycle did
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub resource_samples: usize,
    pub process_samples: usize,
    /// Metric kinds that could not be read this cycle
    pub failures: Vec<String>,
    #[serde(skip)]
    pub pruned: PruneStats,
}

/// Read every metric once. A failing metric is logged and left out of the batch.
pub fn collect_cycle<P: MetricsProvider + ?Sized>(
    provider: &P,
    timestamp: DateTime<Utc>,
) -> (CycleBatch, Vec<String>) {
    let mut batch = CycleBatch::default();
    let mut failures = Vec::new();

    let readings: [(ResourceKind, Result<ResourceReading>); 4] = [
        (
            ResourceKind::Memory,
            provider.memory().map(ResourceReading::Memory),
        ),
        (ResourceKind::Cpu, provider.cpu().map(ResourceReading::Cpu)),
        (
            ResourceKind::DiskIo,
            provider.disk_io().map(ResourceReading::DiskIo),
        ),
        (
            ResourceKind::NetworkIo,
            provider.network_io().map(ResourceReading::NetworkIo),
        ),
    ];

    for (kind, reading) in readings {
        match reading {
            Ok(reading) => batch
                .resources
                .push(ResourceSample::new(timestamp, reading)),
            Err(e) => {
                log::warn!("Skipping {} sample: {}", kind, e);
                failures.push(kind.to_string());
            }
        }
    }

    match provider.processes() {
        Ok(processes) => {
            batch
                .processes
                .extend(processes.into_iter().map(|p| ProcessSample {
                    pid: p.pid,
                    timestamp,
                    memory_percent: p.memory_percent,
                }));
        }
        Err(e) => {
            log::warn!("Skipping process samples: {}", e);
            failures.push("processes".to_string());
        }
    }

    (batch, failures)
}

/// Run one full cycle against the store at time `now`
pub fn sample_cycle<P: MetricsProvider + ?Sized>(
    provider: &P,
    store: &RetentionStore,
    now: DateTime<Utc>,
) -> CycleReport {
    let (batch, failures) = collect_cycle(provider, now);
    let resource_samples = batch.resources.len();
    let process_samples = batch.processes.len();

    let pruned = store.record_cycle(batch, now);

    CycleReport {
        timestamp: now,
        resource_samples,
        process_samples,
        failures,
        pruned,
    }
}

/// Background sampler. The only writer of the retention store.
pub struct Sampler<P: ?Sized> {
    provider: Arc<P>,
    store: Arc<RetentionStore>,
    period: Duration,
    warmup: Duration,
    reports: Option<watch::Sender<Option<CycleReport>>>,
}

impl<P: MetricsProvider + ?Sized + 'static> Sampler<P> {
    pub fn new(provider: Arc<P>, store: Arc<RetentionStore>) -> Self {
        Self {
            provider,
            store,
            period: DEFAULT_SAMPLE_INTERVAL,
            warmup: Duration::ZERO,
            reports: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Delay before the first cycle, e.g. to let CPU usage deltas accumulate
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Publish a report after every completed cycle
    pub fn with_reports(mut self, reports: watch::Sender<Option<CycleReport>>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sample until a shutdown signal arrives.
    ///
    /// Provider calls block, so each cycle runs on the blocking pool. A cycle
    /// that panics is logged and the next attempt waits a full period.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        log::info!(
            "Sampler started (period {:?}, warmup {:?})",
            self.period,
            self.warmup
        );

        let mut ticker = interval_at(Instant::now() + self.warmup, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let provider = Arc::clone(&self.provider);
                    let store = Arc::clone(&self.store);

                    match tokio::task::spawn_blocking(move || {
                        sample_cycle(&*provider, &store, Utc::now())
                    })
                    .await
                    {
                        Ok(report) => {
                            log::debug!(
                                "Sampling cycle done: {} resource, {} process samples, {} pruned, {} failures",
                                report.resource_samples,
                                report.process_samples,
                                report.pruned.resource_samples + report.pruned.process_samples,
                                report.failures.len()
                            );
                            if let Some(reports) = &self.reports {
                                // no receivers is fine
                                let _ = reports.send(Some(report));
                            }
                        }
                        Err(e) => {
                            log::error!("Sampling cycle failed, retrying next period: {}", e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    log::info!("Sampler shutting down");
                    break;
                }
            }
        }
    }
}
