// Scripted metrics provider shared by the integration tests

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use sysmon::core::system_monitor::{
    BatteryStatus, CpuInfo, CpuReading, DiskIoReading, MemoryReading, MetricsProvider,
    NetworkIoReading, PartitionUsage, ProcessDetails, SwapReading, TemperatureReading,
};
use sysmon::{MonitorError, Result};

const MB: u64 = 1024 * 1024;

#[derive(Default)]
struct State {
    cpu_percent: f32,
    memory_percent: f32,
    disk_percent: f32,
    failing: HashSet<&'static str>,
    processes: BTreeMap<u32, ProcessDetails>,
    temperatures: Vec<TemperatureReading>,
    battery: Option<BatteryStatus>,
}

#[derive(Default)]
pub struct ScriptedProvider {
    state: Mutex<State>,
    /// Number of upcoming `processes()` calls that panic
    panics_left: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_usage(&self, cpu: f32, memory: f32, disk: f32) {
        let mut state = self.state.lock();
        state.cpu_percent = cpu;
        state.memory_percent = memory;
        state.disk_percent = disk;
    }

    pub fn set_process(&self, pid: u32, name: &str, memory_percent: f32, memory_mb: u64) {
        self.state.lock().processes.insert(
            pid,
            ProcessDetails {
                pid,
                name: name.to_string(),
                status: "Run".to_string(),
                memory_percent,
                memory_bytes: memory_mb * MB,
                num_threads: Some(1),
                ..Default::default()
            },
        );
    }

    pub fn set_cpu_percent(&self, pid: u32, cpu_percent: f32) {
        if let Some(proc) = self.state.lock().processes.get_mut(&pid) {
            proc.cpu_percent = cpu_percent;
        }
    }

    pub fn add_sensor(&self, label: &str, current: f32, critical: Option<f32>) {
        self.state.lock().temperatures.push(TemperatureReading {
            label: label.to_string(),
            current_celsius: Some(current),
            max_celsius: Some(current),
            critical_celsius: critical,
        });
    }

    pub fn set_battery(&self, battery: Option<BatteryStatus>) {
        self.state.lock().battery = battery;
    }

    pub fn remove_process(&self, pid: u32) {
        self.state.lock().processes.remove(&pid);
    }

    /// Make one metric kind fail, e.g. "memory", "disk_io", "processes" or "battery"
    pub fn fail(&self, what: &'static str) {
        self.state.lock().failing.insert(what);
    }

    pub fn panic_next_cycles(&self, n: usize) {
        self.panics_left.store(n, Ordering::SeqCst);
    }

    fn check(&self, what: &'static str) -> Result<()> {
        if self.state.lock().failing.contains(what) {
            return Err(MonitorError::provider_unavailable(format!(
                "{} is scripted to fail",
                what
            )));
        }
        Ok(())
    }
}

impl MetricsProvider for ScriptedProvider {
    fn memory(&self) -> Result<MemoryReading> {
        self.check("memory")?;
        let percent = self.state.lock().memory_percent;
        Ok(MemoryReading {
            percent,
            total_bytes: 1000 * MB,
            used_bytes: (percent as u64) * 10 * MB,
            available_bytes: (100 - percent.min(100.0) as u64) * 10 * MB,
        })
    }

    fn cpu(&self) -> Result<CpuReading> {
        self.check("cpu")?;
        let cpu = self.state.lock().cpu_percent;
        Ok(CpuReading::from_per_core(vec![cpu; 4]))
    }

    fn disk_io(&self) -> Result<DiskIoReading> {
        self.check("disk_io")?;
        Ok(DiskIoReading {
            read_bytes: 4096,
            write_bytes: 8192,
        })
    }

    fn network_io(&self) -> Result<NetworkIoReading> {
        self.check("network_io")?;
        Ok(NetworkIoReading {
            bytes_sent: 100,
            bytes_recv: 200,
        })
    }

    fn disk_usage_percent(&self) -> Result<f32> {
        self.check("disk")?;
        Ok(self.state.lock().disk_percent)
    }

    fn swap(&self) -> Result<SwapReading> {
        self.check("swap")?;
        Ok(SwapReading::new(512 * MB, 128 * MB))
    }

    fn partitions(&self) -> Result<Vec<PartitionUsage>> {
        self.check("partitions")?;
        let disk_percent = self.state.lock().disk_percent;
        let total = 1000 * MB;
        let free = total - (disk_percent.clamp(0.0, 100.0) as u64) * 10 * MB;
        Ok(vec![PartitionUsage::new(
            "/dev/scripted0".to_string(),
            "/".to_string(),
            "ext4".to_string(),
            total,
            free,
        )])
    }

    fn cpu_info(&self) -> Result<CpuInfo> {
        self.check("cpu_info")?;
        Ok(CpuInfo {
            brand: "Scripted CPU".to_string(),
            physical_cores: Some(2),
            frequency_mhz: 2400,
        })
    }

    fn temperatures(&self) -> Result<Vec<TemperatureReading>> {
        self.check("temperatures")?;
        Ok(self.state.lock().temperatures.clone())
    }

    fn battery(&self) -> Result<Option<BatteryStatus>> {
        self.check("battery")?;
        Ok(self.state.lock().battery)
    }

    fn processes(&self) -> Result<Vec<ProcessDetails>> {
        let should_panic = self
            .panics_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_panic {
            panic!("scripted provider panic");
        }
        self.check("processes")?;
        Ok(self.state.lock().processes.values().cloned().collect())
    }

    fn process(&self, pid: u32) -> Result<ProcessDetails> {
        self.state
            .lock()
            .processes
            .get(&pid)
            .cloned()
            .ok_or(MonitorError::ProcessVanished(pid))
    }
}
