use std::sync::Arc;

use chrono::{Duration, Utc};
use sysmon::core::system_monitor::{
    AlertConfig, AlertConfigUpdate, AlertResource, BatteryStatus, LeakDetector, MemoryReading,
    MonitorService, ProcessSortKey, ResourceKind, ResourceReading, ResourceSample,
    RetentionStore, SharedAlertConfig,
};
use sysmon::MonitorError;

use super::support::ScriptedProvider;

fn setup() -> (
    Arc<ScriptedProvider>,
    Arc<RetentionStore>,
    MonitorService<ScriptedProvider>,
) {
    let provider = Arc::new(ScriptedProvider::new());
    let store = Arc::new(RetentionStore::new());
    let service = MonitorService::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::new(SharedAlertConfig::new(AlertConfig::default())),
        LeakDetector::default(),
    );
    (provider, store, service)
}

#[test]
fn test_history_with_only_old_samples_is_empty() {
    let (_, store, service) = setup();
    let old = Utc::now() - Duration::hours(2);
    for kind in ResourceKind::ALL {
        let reading = match kind {
            ResourceKind::Memory => ResourceReading::Memory(Default::default()),
            ResourceKind::Cpu => ResourceReading::Cpu(Default::default()),
            ResourceKind::DiskIo => ResourceReading::DiskIo(Default::default()),
            ResourceKind::NetworkIo => ResourceReading::NetworkIo(Default::default()),
        };
        store.append(ResourceSample::new(old, reading));
    }

    let history = service.history(1);
    assert!(history.memory.is_empty());
    assert!(history.cpu.is_empty());
    assert!(history.disk_io.is_empty());
    assert!(history.network.is_empty());

    let full = service.history(24);
    assert_eq!(full.memory.len(), 1);
    assert_eq!(full.network.len(), 1);
}

#[test]
fn test_history_with_huge_span_returns_whole_window() {
    let (_, store, service) = setup();
    store.append(ResourceSample::new(
        Utc::now() - Duration::hours(20),
        ResourceReading::Memory(MemoryReading::default()),
    ));

    assert_eq!(service.history(i64::MAX).memory.len(), 1);
    assert_eq!(service.history(1_000_000_000).memory.len(), 1);
    assert!(service.history(-3).memory.is_empty());
}

#[test]
fn test_history_returns_recent_samples_in_order() {
    let (_, store, service) = setup();
    let now = Utc::now();
    for minutes in [50, 30, 10] {
        store.append(ResourceSample::new(
            now - Duration::minutes(minutes),
            ResourceReading::Memory(MemoryReading {
                percent: minutes as f32,
                ..Default::default()
            }),
        ));
    }

    let history = service.history(1);
    let values: Vec<f32> = history
        .memory
        .iter()
        .map(|s| match &s.reading {
            ResourceReading::Memory(m) => m.percent,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(values, vec![50.0, 30.0, 10.0]);
}

#[test]
fn test_processes_sorted_and_limited() {
    let (provider, _, service) = setup();
    provider.set_process(1, "a", 5.0, 50);
    provider.set_process(2, "b", 25.0, 250);
    provider.set_process(3, "c", 15.0, 150);
    provider.set_cpu_percent(1, 90.0);

    let by_memory = service.processes(ProcessSortKey::MemoryPercent, 2).unwrap();
    let pids: Vec<u32> = by_memory.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![2, 3]);

    let by_cpu = service.processes(ProcessSortKey::CpuPercent, 10).unwrap();
    assert_eq!(by_cpu[0].pid, 1);
    assert_eq!(by_cpu.len(), 3);
}

#[test]
fn test_process_lookup() {
    let (provider, _, service) = setup();
    provider.set_process(10, "worker", 1.0, 10);

    let details = service.process(10).unwrap();
    assert_eq!(details.name, "worker");
    assert_eq!(details.num_threads, Some(1));
    assert!(matches!(
        service.process(11),
        Err(MonitorError::NotFound(_))
    ));
}

#[test]
fn test_configure_alerts_validation_keeps_previous() {
    let (_, _, service) = setup();
    let update = AlertConfigUpdate {
        cpu_threshold: Some(60.0),
        memory_threshold: Some(60.0),
        disk_threshold: None,
        enabled: None,
    };

    assert!(matches!(
        service.configure_alerts(&update),
        Err(MonitorError::Validation(_))
    ));
    assert_eq!(service.alert_config(), AlertConfig::default());

    let applied = service
        .configure_alerts(&AlertConfigUpdate::new(60.0, 65.0, 70.0).with_enabled(false))
        .unwrap();
    assert!(!applied.enabled);
    assert_eq!(service.alert_config(), applied);
}

#[test]
fn test_alert_status_uses_current_snapshot() {
    let (provider, _, service) = setup();
    provider.set_usage(95.0, 50.0, 91.0);

    let report = service.alert_status().unwrap();
    assert!(report.status.breached(AlertResource::Cpu));
    assert!(!report.status.breached(AlertResource::Memory));
    assert!(report.status.breached(AlertResource::Disk));
    assert_eq!(report.alerts.len(), 2);

    service
        .configure_alerts(&AlertConfigUpdate::new(80.0, 80.0, 90.0).with_enabled(false))
        .unwrap();
    let report = service.alert_status().unwrap();
    assert!(!report.status.any());
}

#[test]
fn test_queries_do_not_touch_store() {
    let (provider, store, service) = setup();
    provider.set_process(1, "init", 1.0, 10);

    service.overview().unwrap();
    service.processes(ProcessSortKey::default(), 5).unwrap();
    service.alert_status().unwrap();
    service.detect_leaks(None);

    for kind in ResourceKind::ALL {
        assert_eq!(store.series_len(kind), 0);
    }
    assert_eq!(store.tracked_process_count(), 0);
}

#[test]
fn test_overview_degrades_when_optional_metrics_fail() {
    let (provider, _, service) = setup();
    provider.set_usage(10.0, 20.0, 30.0);
    provider.fail("network_io");

    let snapshot = service.overview().unwrap();
    assert!(snapshot.network_io.is_none());
    assert!(snapshot.disk_io.is_some());
    assert_eq!(snapshot.logical_cores, 4);
    assert_eq!(snapshot.disk_usage_percent, Some(30.0));

    provider.fail("memory");
    assert!(matches!(
        service.overview(),
        Err(MonitorError::ProviderUnavailable(_))
    ));
}

#[test]
fn test_overview_includes_swap_partitions_and_cpu_info() {
    let (provider, _, service) = setup();
    provider.set_usage(10.0, 20.0, 30.0);

    let snapshot = service.overview().unwrap();
    let swap = snapshot.swap.unwrap();
    assert_eq!(swap.percent, 25.0);
    assert_eq!(snapshot.partitions.len(), 1);
    assert_eq!(snapshot.partitions[0].mount_point, "/");
    assert!((snapshot.partitions[0].percent - 30.0).abs() < 0.01);
    let info = snapshot.cpu_info.unwrap();
    assert_eq!(info.physical_cores, Some(2));
    assert_eq!(info.frequency_mhz, 2400);

    provider.fail("swap");
    provider.fail("partitions");
    provider.fail("cpu_info");
    let snapshot = service.overview().unwrap();
    assert!(snapshot.swap.is_none());
    assert!(snapshot.partitions.is_empty());
    assert!(snapshot.cpu_info.is_none());
}

#[test]
fn test_temperature_sensors() {
    let (provider, _, service) = setup();
    assert!(service.temperatures().unwrap().is_empty());

    provider.add_sensor("Package id 0", 55.0, Some(100.0));
    provider.add_sensor("acpitz", 40.0, None);

    let sensors = service.temperatures().unwrap();
    assert_eq!(sensors.len(), 2);
    assert_eq!(sensors[0].label, "Package id 0");
    assert_eq!(sensors[0].critical_celsius, Some(100.0));
    assert_eq!(sensors[1].critical_celsius, None);
}

#[test]
fn test_battery_absent_and_present() {
    let (provider, _, service) = setup();
    assert_eq!(service.battery().unwrap(), None);

    let status = BatteryStatus {
        percent: 64.0,
        power_plugged: Some(false),
        secs_left: Some(5400),
    };
    provider.set_battery(Some(status));
    assert_eq!(service.battery().unwrap(), Some(status));

    provider.fail("battery");
    assert!(matches!(
        service.battery(),
        Err(MonitorError::ProviderUnavailable(_))
    ));
}
