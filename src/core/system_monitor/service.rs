//! Read-side facade over the store, provider, detector and alert config.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::alerts::{
    evaluate, evaluate_alerts, Alert, AlertConfig, AlertConfigUpdate, AlertStatus,
    SharedAlertConfig,
};
use super::history::RetentionStore;
use super::leaks::{LeakDetector, LeakReport, MEMORY_TREND_SAMPLES};
use super::metrics::{
    BatteryStatus, ProcessDetails, ResourceKind, ResourceSample, ResourceUsage, SystemSnapshot,
    TemperatureReading,
};
use super::provider::MetricsProvider;
use crate::error::{MonitorError, Result};

pub const DEFAULT_HISTORY_HOURS: i64 = 24;
pub const DEFAULT_PROCESS_LIMIT: usize = 50;

/// Windowed history of every global series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryReport {
    pub memory: Vec<ResourceSample>,
    pub cpu: Vec<ResourceSample>,
    pub disk_io: Vec<ResourceSample>,
    pub network: Vec<ResourceSample>,
}

/// Current alert state together with the config it was evaluated against
#[derive(Debug, Clone, Serialize)]
pub struct AlertReport {
    pub config: AlertConfig,
    pub usage: ResourceUsage,
    pub status: AlertStatus,
    pub alerts: Vec<Alert>,
}

/// Numeric field to order process listings by (descending)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessSortKey {
    #[default]
    MemoryPercent,
    CpuPercent,
    MemoryBytes,
    Pid,
}

impl ProcessSortKey {
    fn compare(&self, a: &ProcessDetails, b: &ProcessDetails) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match self {
            ProcessSortKey::MemoryPercent => b
                .memory_percent
                .partial_cmp(&a.memory_percent)
                .unwrap_or(Ordering::Equal),
            ProcessSortKey::CpuPercent => b
                .cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(Ordering::Equal),
            ProcessSortKey::MemoryBytes => b.memory_bytes.cmp(&a.memory_bytes),
            ProcessSortKey::Pid => b.pid.cmp(&a.pid),
        }
    }
}

impl FromStr for ProcessSortKey {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory_percent" | "memory" => Ok(ProcessSortKey::MemoryPercent),
            "cpu_percent" | "cpu" => Ok(ProcessSortKey::CpuPercent),
            "memory_bytes" | "rss" => Ok(ProcessSortKey::MemoryBytes),
            "pid" => Ok(ProcessSortKey::Pid),
            other => Err(MonitorError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Query surface consumed by the CLI and any other front end
///
/// Cloning is cheap; every clone shares the same store and alert config.
pub struct MonitorService<P: ?Sized> {
    provider: Arc<P>,
    store: Arc<RetentionStore>,
    alert_config: Arc<SharedAlertConfig>,
    detector: LeakDetector,
}

impl<P: ?Sized> Clone for MonitorService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            alert_config: Arc::clone(&self.alert_config),
            detector: self.detector,
        }
    }
}

impl<P: MetricsProvider + ?Sized> MonitorService<P> {
    pub fn new(
        provider: Arc<P>,
        store: Arc<RetentionStore>,
        alert_config: Arc<SharedAlertConfig>,
        detector: LeakDetector,
    ) -> Self {
        Self {
            provider,
            store,
            alert_config,
            detector,
        }
    }

    pub fn store(&self) -> &Arc<RetentionStore> {
        &self.store
    }

    /// Current snapshot straight from the provider
    pub fn overview(&self) -> Result<SystemSnapshot> {
        self.provider.snapshot()
    }

    /// Samples from the last `hours` hours of every global series.
    ///
    /// A span too large to represent covers the whole retained window.
    pub fn history(&self, hours: i64) -> HistoryReport {
        let cutoff = Duration::try_hours(hours.max(0))
            .and_then(|span| Utc::now().checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        HistoryReport {
            memory: self.store.window_since(ResourceKind::Memory, cutoff),
            cpu: self.store.window_since(ResourceKind::Cpu, cutoff),
            disk_io: self.store.window_since(ResourceKind::DiskIo, cutoff),
            network: self.store.window_since(ResourceKind::NetworkIo, cutoff),
        }
    }

    /// Live processes sorted descending by `sort_by`, at most `limit` of them
    pub fn processes(&self, sort_by: ProcessSortKey, limit: usize) -> Result<Vec<ProcessDetails>> {
        let mut processes = self.provider.processes()?;
        processes.sort_by(|a, b| sort_by.compare(a, b));
        processes.truncate(limit);
        Ok(processes)
    }

    pub fn process(&self, pid: u32) -> Result<ProcessDetails> {
        self.provider.process(pid).map_err(|e| match e {
            MonitorError::ProcessVanished(pid) => {
                MonitorError::not_found(format!("process {}", pid))
            }
            other => other,
        })
    }

    pub fn temperatures(&self) -> Result<Vec<TemperatureReading>> {
        self.provider.temperatures()
    }

    /// `None` on machines without a battery
    pub fn battery(&self) -> Result<Option<BatteryStatus>> {
        self.provider.battery()
    }

    /// Leak candidates above `threshold_mb`, or the detector default when `None`,
    /// plus the recent global memory trend
    pub fn detect_leaks(&self, threshold_mb: Option<f64>) -> LeakReport {
        let threshold_mb = threshold_mb.unwrap_or(self.detector.default_threshold_mb());
        LeakReport {
            leak_report: self.detector.detect(&self.store, &*self.provider, threshold_mb),
            memory_trend: self
                .store
                .snapshot_tail(ResourceKind::Memory, MEMORY_TREND_SAMPLES),
        }
    }

    pub fn alert_config(&self) -> AlertConfig {
        self.alert_config.get()
    }

    /// Replace the alert configuration; the old one stays on validation failure
    pub fn configure_alerts(&self, update: &AlertConfigUpdate) -> Result<AlertConfig> {
        let config = self.alert_config.set(update)?;
        log::info!(
            "Alert thresholds updated: cpu {:.1}%, memory {:.1}%, disk {:.1}%, enabled {}",
            config.cpu_threshold,
            config.memory_threshold,
            config.disk_threshold,
            config.enabled
        );
        Ok(config)
    }

    /// Evaluate the stored thresholds against a fresh snapshot
    pub fn alert_status(&self) -> Result<AlertReport> {
        let snapshot = self.provider.snapshot()?;
        let usage = ResourceUsage::from(&snapshot);
        let config = self.alert_config.get();

        Ok(AlertReport {
            config,
            usage,
            status: evaluate(&config, &usage),
            alerts: evaluate_alerts(&config, &usage),
        })
    }
}
