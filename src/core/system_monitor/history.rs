use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::metrics::{ProcessSample, ResourceKind, ResourceSample, Timestamped};

const DEFAULT_RESOURCE_WINDOW_HOURS: i64 = 24;
const DEFAULT_PROCESS_WINDOW_MINUTES: i64 = 60;

/// Time-ordered buffer of samples of one kind
///
/// Samples are kept sorted by timestamp so pruning only ever pops from the front.
#[derive(Debug, Clone)]
pub struct Series<T> {
    samples: VecDeque<T>,
}

impl<T: Timestamped + Clone> Series<T> {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    pub fn push(&mut self, sample: T) {
        let ts = sample.timestamp();
        match self.samples.back() {
            Some(last) if last.timestamp() > ts => {
                // clock went backwards; keep the series ordered
                let pos = self.samples.partition_point(|s| s.timestamp() <= ts);
                self.samples.insert(pos, sample);
            }
            _ => self.samples.push_back(sample),
        }
    }

    /// Drop every sample older than `cutoff`. Returns how many were removed.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while self
            .samples
            .front()
            .is_some_and(|s| s.timestamp() < cutoff)
        {
            self.samples.pop_front();
            removed += 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last `n` samples, oldest first
    pub fn tail(&self, n: usize) -> Vec<T> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).cloned().collect()
    }

    /// Samples strictly newer than `cutoff`, oldest first
    pub fn since(&self, cutoff: DateTime<Utc>) -> Vec<T> {
        let start = self.samples.partition_point(|s| s.timestamp() <= cutoff);
        self.samples.iter().skip(start).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }
}

impl<T: Timestamped + Clone> Default for Series<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximum sample age for each family of series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub resource_window: Duration,
    pub process_window: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            resource_window: Duration::hours(DEFAULT_RESOURCE_WINDOW_HOURS),
            process_window: Duration::minutes(DEFAULT_PROCESS_WINDOW_MINUTES),
        }
    }
}

/// Everything one sampling cycle captured, all sharing one timestamp
#[derive(Debug, Clone, Default)]
pub struct CycleBatch {
    pub resources: Vec<ResourceSample>,
    pub processes: Vec<ProcessSample>,
}

/// Counts returned by a prune pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub resource_samples: usize,
    pub process_samples: usize,
    pub processes_dropped: usize,
}

/// Oldest timestamp a window ending at `now` keeps
fn cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Default)]
struct StoreInner {
    memory: Series<ResourceSample>,
    cpu: Series<ResourceSample>,
    disk_io: Series<ResourceSample>,
    network_io: Series<ResourceSample>,
    processes: HashMap<u32, Series<ProcessSample>>,
}

impl StoreInner {
    fn series(&self, kind: ResourceKind) -> &Series<ResourceSample> {
        match kind {
            ResourceKind::Memory => &self.memory,
            ResourceKind::Cpu => &self.cpu,
            ResourceKind::DiskIo => &self.disk_io,
            ResourceKind::NetworkIo => &self.network_io,
        }
    }

    fn series_mut(&mut self, kind: ResourceKind) -> &mut Series<ResourceSample> {
        match kind {
            ResourceKind::Memory => &mut self.memory,
            ResourceKind::Cpu => &mut self.cpu,
            ResourceKind::DiskIo => &mut self.disk_io,
            ResourceKind::NetworkIo => &mut self.network_io,
        }
    }

    fn prune(&mut self, now: DateTime<Utc>, policy: &RetentionPolicy) -> PruneStats {
        let mut stats = PruneStats::default();

        let resource_cutoff = cutoff(now, policy.resource_window);
        for kind in ResourceKind::ALL {
            stats.resource_samples += self.series_mut(kind).prune_before(resource_cutoff);
        }

        let process_cutoff = cutoff(now, policy.process_window);
        let before = self.processes.len();
        self.processes.retain(|_, series| {
            stats.process_samples += series.prune_before(process_cutoff);
            !series.is_empty()
        });
        stats.processes_dropped = before - self.processes.len();

        stats
    }
}

/// Bounded, time-windowed history of every metric series
///
/// A single reader-writer lock guards all series. Writers hold it for the
/// whole of an append or prune, so readers never see a half-pruned series.
/// Every read hands back an owned copy.
#[derive(Debug, Default)]
pub struct RetentionStore {
    policy: RetentionPolicy,
    inner: RwLock<StoreInner>,
}

impl RetentionStore {
    pub fn new() -> Self {
        Self::with_policy(RetentionPolicy::default())
    }

    pub fn with_policy(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Append a resource sample to the series matching its kind
    pub fn append(&self, sample: ResourceSample) {
        let kind = sample.kind();
        self.inner.write().series_mut(kind).push(sample);
    }

    pub fn append_process(&self, sample: ProcessSample) {
        self.inner
            .write()
            .processes
            .entry(sample.pid)
            .or_default()
            .push(sample);
    }

    /// Drop every sample that fell out of its retention window
    pub fn prune(&self, now: DateTime<Utc>) -> PruneStats {
        self.inner.write().prune(now, &self.policy)
    }

    /// Append a full sampling cycle and prune, as one atomic step
    pub fn record_cycle(&self, batch: CycleBatch, now: DateTime<Utc>) -> PruneStats {
        let mut inner = self.inner.write();
        for sample in batch.resources {
            let kind = sample.kind();
            inner.series_mut(kind).push(sample);
        }
        for sample in batch.processes {
            inner.processes.entry(sample.pid).or_default().push(sample);
        }
        inner.prune(now, &self.policy)
    }

    /// Last `n` samples of a series, oldest first
    pub fn snapshot_tail(&self, kind: ResourceKind, n: usize) -> Vec<ResourceSample> {
        self.inner.read().series(kind).tail(n)
    }

    /// Samples of a series newer than `cutoff`; empty when none match
    pub fn window_since(&self, kind: ResourceKind, cutoff: DateTime<Utc>) -> Vec<ResourceSample> {
        self.inner.read().series(kind).since(cutoff)
    }

    pub fn series_len(&self, kind: ResourceKind) -> usize {
        self.inner.read().series(kind).len()
    }

    pub fn process_series(&self, pid: u32) -> Option<Vec<ProcessSample>> {
        self.inner.read().processes.get(&pid).map(Series::to_vec)
    }

    pub fn all_process_series(&self) -> HashMap<u32, Vec<ProcessSample>> {
        self.inner
            .read()
            .processes
            .iter()
            .map(|(pid, series)| (*pid, series.to_vec()))
            .collect()
    }

    /// Last `n` memory percentages of every process with at least `n` samples
    pub fn process_trends(&self, n: usize) -> Vec<(u32, Vec<f32>)> {
        if n == 0 {
            return Vec::new();
        }
        self.inner
            .read()
            .processes
            .iter()
            .filter(|(_, series)| series.len() >= n)
            .map(|(pid, series)| {
                let trend = series.tail(n).iter().map(|s| s.memory_percent).collect();
                (*pid, trend)
            })
            .collect()
    }

    pub fn tracked_process_count(&self) -> usize {
        self.inner.read().processes.len()
    }
}
