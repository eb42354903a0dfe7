use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Global resource series tracked by the retention store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Memory,
    Cpu,
    DiskIo,
    NetworkIo,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Memory,
        ResourceKind::Cpu,
        ResourceKind::DiskIo,
        ResourceKind::NetworkIo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Memory => "memory",
            ResourceKind::Cpu => "cpu",
            ResourceKind::DiskIo => "disk_io",
            ResourceKind::NetworkIo => "network_io",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReading {
    pub percent: f32,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuReading {
    pub per_core_percent: Vec<f32>,
    pub average_percent: f32,
}

impl CpuReading {
    /// Build a reading from per-core utilization, averaging across cores.
    pub fn from_per_core(per_core_percent: Vec<f32>) -> Self {
        let average_percent = if per_core_percent.is_empty() {
            0.0
        } else {
            per_core_percent.iter().sum::<f32>() / per_core_percent.len() as f32
        };
        Self {
            per_core_percent,
            average_percent,
        }
    }
}

/// Swap usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapReading {
    pub percent: f32,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl SwapReading {
    pub fn new(total_bytes: u64, used_bytes: u64) -> Self {
        Self {
            percent: percent_of(used_bytes, total_bytes),
            total_bytes,
            used_bytes,
            free_bytes: total_bytes.saturating_sub(used_bytes),
        }
    }
}

/// Capacity of one mounted partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionUsage {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub percent: f32,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl PartitionUsage {
    pub fn new(
        device: String,
        mount_point: String,
        file_system: String,
        total_bytes: u64,
        free_bytes: u64,
    ) -> Self {
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        Self {
            device,
            mount_point,
            file_system,
            percent: percent_of(used_bytes, total_bytes),
            total_bytes,
            used_bytes,
            free_bytes,
        }
    }
}

/// Static CPU description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub brand: String,
    pub physical_cores: Option<usize>,
    /// Average current frequency across cores
    pub frequency_mhz: u64,
}

/// One hardware temperature sensor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub label: String,
    pub current_celsius: Option<f32>,
    pub max_celsius: Option<f32>,
    pub critical_celsius: Option<f32>,
}

/// Charge state of the first battery
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub percent: f32,
    /// None when the charger state is unknown
    pub power_plugged: Option<bool>,
    pub secs_left: Option<u64>,
}

fn percent_of(part: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (part as f32 / total as f32) * 100.0
    }
}

/// Cumulative disk I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskIoReading {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Cumulative network I/O counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIoReading {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Kind-specific payload of a resource sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceReading {
    Memory(MemoryReading),
    Cpu(CpuReading),
    DiskIo(DiskIoReading),
    NetworkIo(NetworkIoReading),
}

impl ResourceReading {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceReading::Memory(_) => ResourceKind::Memory,
            ResourceReading::Cpu(_) => ResourceKind::Cpu,
            ResourceReading::DiskIo(_) => ResourceKind::DiskIo,
            ResourceReading::NetworkIo(_) => ResourceKind::NetworkIo,
        }
    }
}

/// Trait for anything stored in a time-ordered series
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// One global resource reading captured by a sampling cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub reading: ResourceReading,
}

impl ResourceSample {
    pub fn new(timestamp: DateTime<Utc>, reading: ResourceReading) -> Self {
        Self { timestamp, reading }
    }

    pub fn kind(&self) -> ResourceKind {
        self.reading.kind()
    }
}

impl Timestamped for ResourceSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Memory share of a single process at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub timestamp: DateTime<Utc>,
    pub memory_percent: f32,
}

impl Timestamped for ProcessSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Point-in-time details for a single process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub memory_bytes: u64,
    /// Unknown on platforms that do not expose per-process threads
    pub num_threads: Option<usize>,
    pub start_time: Option<DateTime<Utc>>,
    pub username: Option<String>,
    pub cmdline: String,
}

impl ProcessDetails {
    /// Resident memory in mebibytes
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Complete current-state view returned by the overview query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuReading,
    pub cpu_info: Option<CpuInfo>,
    pub memory: MemoryReading,
    pub swap: Option<SwapReading>,
    pub disk_usage_percent: Option<f32>,
    pub partitions: Vec<PartitionUsage>,
    pub disk_io: Option<DiskIoReading>,
    pub network_io: Option<NetworkIoReading>,
    pub boot_time: Option<DateTime<Utc>>,
    pub uptime_secs: u64,
    pub logical_cores: usize,
    pub process_count: usize,
}

/// The three headline percentages the alert evaluator compares against thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
}

impl From<&SystemSnapshot> for ResourceUsage {
    fn from(snapshot: &SystemSnapshot) -> Self {
        Self {
            cpu_percent: snapshot.cpu.average_percent,
            memory_percent: snapshot.memory.percent,
            disk_percent: snapshot.disk_usage_percent.unwrap_or(0.0),
        }
    }
}
