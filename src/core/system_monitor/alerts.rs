//! Threshold alerts for the headline resource percentages.
//!
//! Compares current readings against the configured thresholds. The evaluator
//! is a pure function; the shared configuration lives in [`SharedAlertConfig`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::metrics::ResourceUsage;
use crate::error::{MonitorError, Result};

/// Alert configuration with thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub cpu_threshold: f32,    // %
    pub memory_threshold: f32, // %
    pub disk_threshold: f32,   // %
    pub enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: 80.0,
            memory_threshold: 80.0,
            disk_threshold: 90.0,
            enabled: true,
        }
    }
}

/// A configuration write as received from a caller; every threshold is required
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertConfigUpdate {
    pub cpu_threshold: Option<f32>,
    pub memory_threshold: Option<f32>,
    pub disk_threshold: Option<f32>,
    pub enabled: Option<bool>,
}

impl AlertConfigUpdate {
    pub fn new(cpu: f32, memory: f32, disk: f32) -> Self {
        Self {
            cpu_threshold: Some(cpu),
            memory_threshold: Some(memory),
            disk_threshold: Some(disk),
            enabled: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Parse an update from loosely-typed JSON. Numeric strings are accepted.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| MonitorError::validation("alert configuration must be an object"))?;

        let threshold = |field: &str| -> Result<Option<f32>> {
            match object.get(field) {
                None | Some(serde_json::Value::Null) => Ok(None),
                Some(serde_json::Value::Number(n)) => n
                    .as_f64()
                    .map(|v| Some(v as f32))
                    .ok_or_else(|| MonitorError::validation(format!("{} is not numeric", field))),
                Some(serde_json::Value::String(s)) => s
                    .trim()
                    .parse::<f32>()
                    .map(Some)
                    .map_err(|_| MonitorError::validation(format!("{} is not numeric", field))),
                Some(_) => Err(MonitorError::validation(format!(
                    "{} is not numeric",
                    field
                ))),
            }
        };

        let enabled = match object.get("enabled") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Bool(b)) => Some(*b),
            Some(_) => return Err(MonitorError::validation("enabled must be a boolean")),
        };

        Ok(Self {
            cpu_threshold: threshold("cpu_threshold")?,
            memory_threshold: threshold("memory_threshold")?,
            disk_threshold: threshold("disk_threshold")?,
            enabled,
        })
    }

    /// Turn the update into a complete config, or explain what is wrong with it
    pub fn validate(&self) -> Result<AlertConfig> {
        let missing: Vec<&str> = [
            ("cpu_threshold", self.cpu_threshold),
            ("memory_threshold", self.memory_threshold),
            ("disk_threshold", self.disk_threshold),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(MonitorError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let check = |name: &str, value: Option<f32>| -> Result<f32> {
            let value = value.unwrap_or_default();
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(MonitorError::validation(format!(
                    "{} must be a percentage between 0 and 100, got {}",
                    name, value
                )));
            }
            Ok(value)
        };

        Ok(AlertConfig {
            cpu_threshold: check("cpu_threshold", self.cpu_threshold)?,
            memory_threshold: check("memory_threshold", self.memory_threshold)?,
            disk_threshold: check("disk_threshold", self.disk_threshold)?,
            enabled: self.enabled.unwrap_or(true),
        })
    }
}

/// The single alert configuration of a monitor, replaced as a whole value
#[derive(Debug, Default)]
pub struct SharedAlertConfig {
    current: RwLock<AlertConfig>,
}

impl SharedAlertConfig {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    pub fn get(&self) -> AlertConfig {
        *self.current.read()
    }

    /// Validate and swap in a new configuration. On error the stored one is untouched.
    pub fn set(&self, update: &AlertConfigUpdate) -> Result<AlertConfig> {
        let config = update.validate()?;
        *self.current.write() = config;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertResource {
    Cpu,
    Memory,
    Disk,
}

/// Which resources are over their thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStatus {
    pub cpu: bool,
    pub memory: bool,
    pub disk: bool,
}

impl AlertStatus {
    pub fn breached(&self, resource: AlertResource) -> bool {
        match resource {
            AlertResource::Cpu => self.cpu,
            AlertResource::Memory => self.memory,
            AlertResource::Disk => self.disk,
        }
    }

    pub fn any(&self) -> bool {
        self.cpu || self.memory || self.disk
    }
}

/// An individual alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub resource: AlertResource,
    pub message: String,
    pub value: f32,
    pub threshold: f32,
}

/// Evaluate current usage against the thresholds
pub fn evaluate(config: &AlertConfig, current: &ResourceUsage) -> AlertStatus {
    if !config.enabled {
        return AlertStatus::default();
    }

    AlertStatus {
        cpu: current.cpu_percent > config.cpu_threshold,
        memory: current.memory_percent > config.memory_threshold,
        disk: current.disk_percent > config.disk_threshold,
    }
}

/// Describe every breached resource
pub fn evaluate_alerts(config: &AlertConfig, current: &ResourceUsage) -> Vec<Alert> {
    let status = evaluate(config, current);
    let mut alerts = Vec::new();

    if status.cpu {
        alerts.push(Alert {
            resource: AlertResource::Cpu,
            message: format!(
                "CPU usage at {:.1}% (threshold: {:.1}%)",
                current.cpu_percent, config.cpu_threshold
            ),
            value: current.cpu_percent,
            threshold: config.cpu_threshold,
        });
    }

    if status.memory {
        alerts.push(Alert {
            resource: AlertResource::Memory,
            message: format!(
                "Memory usage at {:.1}% (threshold: {:.1}%)",
                current.memory_percent, config.memory_threshold
            ),
            value: current.memory_percent,
            threshold: config.memory_threshold,
        });
    }

    if status.disk {
        alerts.push(Alert {
            resource: AlertResource::Disk,
            message: format!(
                "Disk usage at {:.1}% (threshold: {:.1}%)",
                current.disk_percent, config.disk_threshold
            ),
            value: current.disk_percent,
            threshold: config.disk_threshold,
        });
    }

    alerts
}
