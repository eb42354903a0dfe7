//! Tokio runtime that hosts the background sampler.
//!
//! Synchronous callers (the CLI) get a running monitor plus a query handle
//! without having to set up async themselves.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use super::alerts::SharedAlertConfig;
use super::history::RetentionStore;
use super::provider::{MetricsProvider, SysinfoProvider};
use super::sampler::{CycleReport, Sampler};
use super::service::MonitorService;
use crate::core::config::Config;
use crate::error::{MonitorError, Result};

/// A running monitor: sampler task, shared store and query surface.
pub struct MonitorRuntime<P: ?Sized = SysinfoProvider> {
    service: MonitorService<P>,

    /// Latest completed sampling cycle
    cycle_rx: watch::Receiver<Option<CycleReport>>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Runtime hosting the sampler (dropped on shutdown)
    runtime: tokio::runtime::Runtime,
}

impl MonitorRuntime<SysinfoProvider> {
    /// Start monitoring the local machine
    pub fn start(config: &Config) -> Result<Self> {
        let provider = Arc::new(SysinfoProvider::new());
        Self::with_provider(provider, config, sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
    }
}

impl<P: MetricsProvider + ?Sized + 'static> MonitorRuntime<P> {
    /// Start monitoring with an arbitrary provider
    pub fn with_provider(provider: Arc<P>, config: &Config, warmup: Duration) -> Result<Self> {
        log::info!("Initializing monitor runtime");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("sysmon-worker")
            .build()?;

        let store = Arc::new(RetentionStore::with_policy(config.retention_policy()));
        let alert_config = Arc::new(SharedAlertConfig::new(config.alerts));
        let service = MonitorService::new(
            Arc::clone(&provider),
            Arc::clone(&store),
            alert_config,
            config.leak_detector(),
        );

        let (cycle_tx, cycle_rx) = watch::channel(None);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let sampler = Sampler::new(provider, store)
            .with_period(config.sample_interval())
            .with_warmup(warmup)
            .with_reports(cycle_tx);

        runtime.spawn(sampler.run(shutdown_tx.subscribe()));

        Ok(Self {
            service,
            cycle_rx,
            shutdown_tx,
            runtime,
        })
    }

    pub fn service(&self) -> &MonitorService<P> {
        &self.service
    }

    /// Block until the next sampling cycle completes or `timeout` passes
    pub fn wait_for_cycle(&mut self, timeout: Duration) -> Result<Option<CycleReport>> {
        let cycle_rx = &mut self.cycle_rx;
        let changed = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, cycle_rx.changed()).await });

        match changed {
            Err(_elapsed) => Ok(None),
            Ok(Ok(())) => Ok(cycle_rx.borrow_and_update().clone()),
            Ok(Err(_)) => Err(MonitorError::runtime("sampler stopped")),
        }
    }

    /// Signal the sampler to stop. Stored history stays queryable.
    pub fn stop_sampling(&self) {
        // fails only when the sampler already exited
        let _ = self.shutdown_tx.send(());
    }

    /// Stop the sampler and tear down the runtime
    pub fn shutdown(self) {
        log::info!("Shutting down monitor runtime");
        self.stop_sampling();
        self.runtime.shutdown_timeout(Duration::from_secs(5));
    }
}
