use std::io;
use thiserror::Error;

/// Error type for the sysmon library
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Metrics provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Process {0} no longer exists")]
    ProcessVanished(u32),

    #[error("Invalid alert configuration: {0}")]
    Validation(String),

    #[error("Unknown sort field: {0}")]
    UnknownSortKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for the sysmon library
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        MonitorError::ProviderUnavailable(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        MonitorError::Validation(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        MonitorError::NotFound(msg.into())
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        MonitorError::Runtime(msg.into())
    }

    /// True when the process exited or can no longer be read
    pub fn is_process_gone(&self) -> bool {
        matches!(self, MonitorError::ProcessVanished(_))
    }
}
