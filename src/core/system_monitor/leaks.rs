//! Heuristic memory-leak detection over per-process history.
//!
//! A process is a candidate when its last few memory samples are strictly
//! increasing and its current resident memory is above a threshold. This is a
//! coarse pre-filter: noisy growth is missed, plateaus never match.

use serde::{Deserialize, Serialize};

use super::history::RetentionStore;
use super::metrics::ResourceSample;
use super::provider::MetricsProvider;

pub const DEFAULT_TREND_POINTS: usize = 5;
pub const DEFAULT_THRESHOLD_MB: f64 = 100.0;
/// Global memory samples returned alongside the candidates
pub const MEMORY_TREND_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakSeverity {
    Elevated,
    /// Resident memory above twice the threshold
    High,
}

/// A process whose memory keeps growing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakCandidate {
    pub pid: u32,
    pub name: String,
    pub memory_mb: f64,
    pub trend: Vec<f32>,
    pub severity: LeakSeverity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeakReport {
    pub leak_report: Vec<LeakCandidate>,
    /// Most recent global memory samples, oldest first
    pub memory_trend: Vec<ResourceSample>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeakDetector {
    trend_points: usize,
    default_threshold_mb: f64,
}

impl Default for LeakDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_POINTS, DEFAULT_THRESHOLD_MB)
    }
}

impl LeakDetector {
    pub fn new(trend_points: usize, default_threshold_mb: f64) -> Self {
        Self {
            // a single point has no direction
            trend_points: trend_points.max(2),
            default_threshold_mb,
        }
    }

    pub fn trend_points(&self) -> usize {
        self.trend_points
    }

    pub fn default_threshold_mb(&self) -> f64 {
        self.default_threshold_mb
    }

    /// Scan the process history for leak candidates, ordered by pid
    pub fn detect<P: MetricsProvider + ?Sized>(
        &self,
        store: &RetentionStore,
        provider: &P,
        threshold_mb: f64,
    ) -> Vec<LeakCandidate> {
        // trends are copied out so the provider is never called under the store lock
        let mut trends = store.process_trends(self.trend_points);
        trends.sort_by_key(|(pid, _)| *pid);

        trends
            .into_iter()
            .filter(|(_, trend)| is_strictly_increasing(trend))
            .filter_map(|(pid, trend)| {
                let details = match provider.process(pid) {
                    Ok(details) => details,
                    Err(e) if e.is_process_gone() => {
                        log::debug!("Skipping leak check for pid {}: {}", pid, e);
                        return None;
                    }
                    Err(e) => {
                        log::warn!("Failed to query pid {} for leak check: {}", pid, e);
                        return None;
                    }
                };

                let memory_mb = details.memory_mb();
                if memory_mb <= threshold_mb {
                    return None;
                }

                Some(LeakCandidate {
                    pid,
                    name: details.name,
                    memory_mb,
                    trend,
                    severity: severity_for(memory_mb, threshold_mb),
                })
            })
            .collect()
    }
}

/// True when every value is greater than the one before it
pub fn is_strictly_increasing(values: &[f32]) -> bool {
    values.windows(2).all(|pair| pair[1] > pair[0])
}

fn severity_for(memory_mb: f64, threshold_mb: f64) -> LeakSeverity {
    if memory_mb > threshold_mb * 2.0 {
        LeakSeverity::High
    } else {
        LeakSeverity::Elevated
    }
}
