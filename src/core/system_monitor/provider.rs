use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, Pid, ProcessRefreshKind,
    ProcessesToUpdate, RefreshKind, System, UpdateKind, Users,
};

use crate::error::{MonitorError, Result};

use super::metrics::*;

/// Trait for platform metrics sources
///
/// The sampler, leak detector and query surface only ever talk to the
/// operating system through this trait, so tests can substitute scripted
/// readings.
pub trait MetricsProvider: Send + Sync {
    /// Current global memory usage
    fn memory(&self) -> Result<MemoryReading>;

    /// Per-core CPU utilization since the previous call
    fn cpu(&self) -> Result<CpuReading>;

    /// Cumulative disk I/O counters across all disks
    fn disk_io(&self) -> Result<DiskIoReading>;

    /// Cumulative network I/O counters across all interfaces
    fn network_io(&self) -> Result<NetworkIoReading>;

    /// Percentage of disk capacity in use
    fn disk_usage_percent(&self) -> Result<f32>;

    fn swap(&self) -> Result<SwapReading>;

    /// Capacity of every mounted partition
    fn partitions(&self) -> Result<Vec<PartitionUsage>>;

    fn cpu_info(&self) -> Result<CpuInfo>;

    /// Every readable temperature sensor; empty when the platform has none
    fn temperatures(&self) -> Result<Vec<TemperatureReading>>;

    /// `None` on machines without a battery
    fn battery(&self) -> Result<Option<BatteryStatus>>;

    /// Every process that could be enumerated right now
    fn processes(&self) -> Result<Vec<ProcessDetails>>;

    /// Look up one process. Fails with `ProcessVanished` when it cannot be read.
    fn process(&self, pid: u32) -> Result<ProcessDetails>;

    fn boot_time(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Compose a full snapshot. Memory and CPU are required, the rest is best effort.
    fn snapshot(&self) -> Result<SystemSnapshot> {
        let timestamp = Utc::now();
        let cpu = self.cpu()?;
        let memory = self.memory()?;
        let process_count = self.processes().map(|p| p.len()).unwrap_or(0);
        let boot_time = self.boot_time();
        let uptime_secs = boot_time
            .map(|boot| (timestamp - boot).num_seconds().max(0) as u64)
            .unwrap_or(0);

        Ok(SystemSnapshot {
            timestamp,
            logical_cores: cpu.per_core_percent.len(),
            cpu,
            cpu_info: self.cpu_info().ok(),
            memory,
            swap: self.swap().ok(),
            disk_usage_percent: self.disk_usage_percent().ok(),
            partitions: self.partitions().unwrap_or_default(),
            disk_io: self.disk_io().ok(),
            network_io: self.network_io().ok(),
            boot_time,
            uptime_secs,
            process_count,
        })
    }
}

struct SysinfoState {
    system: System,
    disks: Disks,
    networks: Networks,
    components: Components,
    users: Users,
}

/// Metrics provider backed by `sysinfo`
///
/// sysinfo needs `&mut` to refresh, so the handles live behind a mutex and
/// each call refreshes only what it reads.
pub struct SysinfoProvider {
    state: Mutex<SysinfoState>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        let system = System::new_with_specifics(refresh_kind);

        Self {
            state: Mutex::new(SysinfoState {
                system,
                disks: Disks::new_with_refreshed_list(),
                networks: Networks::new_with_refreshed_list(),
                components: Components::new_with_refreshed_list(),
                users: Users::new_with_refreshed_list(),
            }),
        }
    }

    fn process_refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_tasks()
            .with_user(UpdateKind::OnlyIfNotSet)
            .with_cmd(UpdateKind::OnlyIfNotSet)
    }

    fn to_details(state: &SysinfoState, proc: &sysinfo::Process) -> ProcessDetails {
        let total_memory = state.system.total_memory();
        let mem = proc.memory();

        ProcessDetails {
            pid: proc.pid().as_u32(),
            name: proc.name().to_string_lossy().to_string(),
            status: format!("{:?}", proc.status()),
            cpu_percent: proc.cpu_usage(),
            memory_percent: if total_memory > 0 {
                (mem as f32 / total_memory as f32) * 100.0
            } else {
                0.0
            },
            memory_bytes: mem,
            num_threads: proc.tasks().map(|tasks| tasks.len()),
            start_time: Utc.timestamp_opt(proc.start_time() as i64, 0).single(),
            username: proc
                .user_id()
                .and_then(|uid| state.users.get_user_by_id(uid))
                .map(|user| user.name().to_string()),
            cmdline: proc
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn memory(&self) -> Result<MemoryReading> {
        let mut state = self.state.lock();
        state.system.refresh_memory();

        let total = state.system.total_memory();
        if total == 0 {
            return Err(MonitorError::provider_unavailable(
                "total memory reported as zero",
            ));
        }
        let used = state.system.used_memory();

        Ok(MemoryReading {
            percent: (used as f32 / total as f32) * 100.0,
            total_bytes: total,
            used_bytes: used,
            available_bytes: state.system.available_memory(),
        })
    }

    fn cpu(&self) -> Result<CpuReading> {
        let mut state = self.state.lock();
        state.system.refresh_cpu_usage();

        let cpus = state.system.cpus();
        if cpus.is_empty() {
            return Err(MonitorError::provider_unavailable("no CPUs reported"));
        }

        Ok(CpuReading::from_per_core(
            cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
        ))
    }

    fn disk_io(&self) -> Result<DiskIoReading> {
        let mut state = self.state.lock();
        state.disks.refresh(true);

        if state.disks.list().is_empty() {
            return Err(MonitorError::provider_unavailable("no disks reported"));
        }

        Ok(state
            .disks
            .iter()
            .fold(DiskIoReading::default(), |acc, disk| {
                let usage = disk.usage();
                DiskIoReading {
                    read_bytes: acc.read_bytes.saturating_add(usage.total_read_bytes),
                    write_bytes: acc.write_bytes.saturating_add(usage.total_written_bytes),
                }
            }))
    }

    fn network_io(&self) -> Result<NetworkIoReading> {
        let mut state = self.state.lock();
        state.networks.refresh(true);

        if state.networks.is_empty() {
            return Err(MonitorError::provider_unavailable(
                "no network interfaces reported",
            ));
        }

        Ok(state
            .networks
            .values()
            .fold(NetworkIoReading::default(), |acc, data| NetworkIoReading {
                bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
            }))
    }

    fn disk_usage_percent(&self) -> Result<f32> {
        let mut state = self.state.lock();
        state.disks.refresh(true);

        let usage_of = |total: u64, available: u64| -> Option<f32> {
            (total > 0).then(|| (total.saturating_sub(available) as f32 / total as f32) * 100.0)
        };

        if let Some(root) = state
            .disks
            .iter()
            .find(|disk| disk.mount_point() == std::path::Path::new("/"))
        {
            if let Some(percent) = usage_of(root.total_space(), root.available_space()) {
                return Ok(percent);
            }
        }

        let (total, available) = state.disks.iter().fold((0u64, 0u64), |acc, disk| {
            (
                acc.0.saturating_add(disk.total_space()),
                acc.1.saturating_add(disk.available_space()),
            )
        });

        usage_of(total, available)
            .ok_or_else(|| MonitorError::provider_unavailable("no disk capacity reported"))
    }

    fn swap(&self) -> Result<SwapReading> {
        let mut state = self.state.lock();
        state.system.refresh_memory();

        Ok(SwapReading::new(
            state.system.total_swap(),
            state.system.used_swap(),
        ))
    }

    fn partitions(&self) -> Result<Vec<PartitionUsage>> {
        let mut state = self.state.lock();
        state.disks.refresh(true);

        Ok(state
            .disks
            .iter()
            .map(|disk| {
                PartitionUsage::new(
                    disk.name().to_string_lossy().to_string(),
                    disk.mount_point().to_string_lossy().to_string(),
                    disk.file_system().to_string_lossy().to_string(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect())
    }

    fn cpu_info(&self) -> Result<CpuInfo> {
        let mut state = self.state.lock();
        state.system.refresh_cpu_frequency();

        let cpus = state.system.cpus();
        if cpus.is_empty() {
            return Err(MonitorError::provider_unavailable("no CPUs reported"));
        }
        let total_mhz: u64 = cpus.iter().map(|cpu| cpu.frequency()).sum();

        Ok(CpuInfo {
            brand: cpus[0].brand().trim().to_string(),
            physical_cores: System::physical_core_count(),
            frequency_mhz: total_mhz / cpus.len() as u64,
        })
    }

    fn temperatures(&self) -> Result<Vec<TemperatureReading>> {
        let mut state = self.state.lock();
        state.components.refresh(true);

        Ok(state
            .components
            .iter()
            .map(|comp| TemperatureReading {
                label: comp.label().to_string(),
                current_celsius: comp.temperature(),
                max_celsius: comp.max(),
                critical_celsius: comp.critical(),
            })
            .collect())
    }

    fn battery(&self) -> Result<Option<BatteryStatus>> {
        use battery::units::ratio::percent;
        use battery::units::time::second;

        let unavailable =
            |e: battery::Error| MonitorError::provider_unavailable(format!("battery: {}", e));

        let manager = battery::Manager::new().map_err(unavailable)?;
        let first = match manager.batteries().map_err(unavailable)?.next() {
            Some(cell) => cell.map_err(unavailable)?,
            None => return Ok(None),
        };

        let power_plugged = match first.state() {
            battery::State::Charging | battery::State::Full => Some(true),
            battery::State::Discharging | battery::State::Empty => Some(false),
            _ => None,
        };

        Ok(Some(BatteryStatus {
            percent: first.state_of_charge().get::<percent>(),
            power_plugged,
            secs_left: first
                .time_to_empty()
                .map(|time| time.get::<second>().max(0.0) as u64),
        }))
    }

    fn processes(&self) -> Result<Vec<ProcessDetails>> {
        let mut state = self.state.lock();
        state.system.refresh_memory();
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            Self::process_refresh_kind(),
        );

        let state = &*state;
        Ok(state
            .system
            .processes()
            .values()
            // threads show up as their own entries once tasks are refreshed
            .filter(|proc| proc.thread_kind().is_none())
            .map(|proc| Self::to_details(state, proc))
            .collect())
    }

    fn process(&self, pid: u32) -> Result<ProcessDetails> {
        let mut state = self.state.lock();
        let sys_pid = Pid::from_u32(pid);
        state.system.refresh_memory();
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            Self::process_refresh_kind(),
        );

        let state = &*state;
        state
            .system
            .process(sys_pid)
            .map(|proc| Self::to_details(state, proc))
            .ok_or(MonitorError::ProcessVanished(pid))
    }

    fn boot_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(System::boot_time() as i64, 0).single()
    }
}
