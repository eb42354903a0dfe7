use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::system_monitor::history::RetentionPolicy;
use crate::core::system_monitor::leaks::{LeakDetector, DEFAULT_THRESHOLD_MB, DEFAULT_TREND_POINTS};
use crate::core::system_monitor::AlertConfig;

const MAX_RESOURCE_RETENTION_HOURS: i64 = 366 * 24;
const MAX_PROCESS_RETENTION_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakSettings {
    /// Number of trailing samples that must be strictly increasing
    pub trend_points: usize,
    pub threshold_mb: f64,
}

impl Default for LeakSettings {
    fn default() -> Self {
        Self {
            trend_points: DEFAULT_TREND_POINTS,
            threshold_mb: DEFAULT_THRESHOLD_MB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sample_interval_secs: u64,
    pub resource_retention_hours: i64,
    pub process_retention_minutes: i64,
    pub top_processes: usize,
    pub leak: LeakSettings,
    pub alerts: AlertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_interval_secs: 60,
            resource_retention_hours: 24,
            process_retention_minutes: 60,
            top_processes: 50,
            leak: LeakSettings::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable config file {:?} ({}), using defaults",
                config_path,
                e
            );
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_vec_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("sysmon").join("config.json"))
    }

    pub fn sample_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sample_interval_secs.max(1))
    }

    /// Retention windows, clamped to between one unit and a year
    pub fn retention_policy(&self) -> RetentionPolicy {
        let hours = self
            .resource_retention_hours
            .clamp(1, MAX_RESOURCE_RETENTION_HOURS);
        let minutes = self
            .process_retention_minutes
            .clamp(1, MAX_PROCESS_RETENTION_MINUTES);

        RetentionPolicy {
            resource_window: chrono::Duration::try_hours(hours)
                .unwrap_or(chrono::Duration::MAX),
            process_window: chrono::Duration::try_minutes(minutes)
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn leak_detector(&self) -> LeakDetector {
        LeakDetector::new(self.leak.trend_points, self.leak.threshold_mb)
    }
}
