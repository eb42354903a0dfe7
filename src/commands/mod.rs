// Command handlers module
pub mod alerts;
pub mod overview;
pub mod processes;
pub mod sensors;
pub mod version;
pub mod watch;

use std::sync::Arc;

use crate::core::system_monitor::{
    MonitorService, RetentionStore, SharedAlertConfig, SysinfoProvider,
};
use crate::core::Config;

// Re-exports for cleaner imports
pub use version::execute as version;

/// Query surface over the local machine for one-shot commands.
///
/// One-shot commands never sample, so the store stays empty; only the
/// provider-backed queries are meaningful here.
pub(crate) fn local_service(config: &Config) -> MonitorService<SysinfoProvider> {
    let provider = Arc::new(SysinfoProvider::new());
    // CPU usage is a delta between two refreshes
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    MonitorService::new(
        provider,
        Arc::new(RetentionStore::with_policy(config.retention_policy())),
        Arc::new(SharedAlertConfig::new(config.alerts)),
        config.leak_detector(),
    )
}
