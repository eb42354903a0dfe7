//! System monitoring core functionality.
//!
//! This module samples system metrics on a fixed cadence, keeps them in
//! time-windowed history, and derives threshold alerts and memory-leak
//! suspicion from that history.

pub mod alerts;
pub mod history;
pub mod leaks;
mod metrics;
mod provider;
pub mod runtime;
pub mod sampler;
pub mod service;

pub use alerts::{
    evaluate, evaluate_alerts, Alert, AlertConfig, AlertConfigUpdate, AlertResource, AlertStatus,
    SharedAlertConfig,
};
pub use history::{CycleBatch, PruneStats, RetentionPolicy, RetentionStore, Series};
pub use leaks::{LeakCandidate, LeakDetector, LeakReport, LeakSeverity, MEMORY_TREND_SAMPLES};
pub use metrics::{
    BatteryStatus, CpuInfo, CpuReading, DiskIoReading, MemoryReading, NetworkIoReading,
    PartitionUsage, ProcessDetails, ProcessSample, ResourceKind, ResourceReading, ResourceSample,
    ResourceUsage, SwapReading, SystemSnapshot, TemperatureReading, Timestamped,
};
pub use provider::{MetricsProvider, SysinfoProvider};
pub use runtime::MonitorRuntime;
pub use sampler::{collect_cycle, sample_cycle, CycleReport, Sampler, DEFAULT_SAMPLE_INTERVAL};
pub use service::{AlertReport, HistoryReport, MonitorService, ProcessSortKey};
