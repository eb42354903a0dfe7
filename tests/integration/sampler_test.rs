use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sysmon::core::system_monitor::{sample_cycle, ResourceKind, RetentionStore, Sampler};
use tokio::sync::{broadcast, watch};

use super::support::ScriptedProvider;

#[test]
fn test_cycle_appends_one_sample_per_kind_with_shared_timestamp() {
    let provider = ScriptedProvider::new();
    provider.set_usage(30.0, 40.0, 50.0);
    provider.set_process(1, "init", 0.5, 10);
    provider.set_process(2, "shell", 1.5, 20);
    let store = RetentionStore::new();
    let now = Utc::now();

    let report = sample_cycle(&provider, &store, now);

    assert_eq!(report.resource_samples, 4);
    assert_eq!(report.process_samples, 2);
    assert!(report.failures.is_empty());
    for kind in ResourceKind::ALL {
        let series = store.snapshot_tail(kind, usize::MAX);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].timestamp, now);
        assert_eq!(series[0].kind(), kind);
    }
    let shell = store.process_series(2).unwrap();
    assert_eq!(shell[0].memory_percent, 1.5);
    assert_eq!(shell[0].timestamp, now);
}

#[test]
fn test_failing_metric_is_skipped_not_fatal() {
    let provider = ScriptedProvider::new();
    provider.set_process(1, "init", 0.5, 10);
    provider.fail("disk_io");
    provider.fail("network_io");
    let store = RetentionStore::new();

    let report = sample_cycle(&provider, &store, Utc::now());

    assert_eq!(report.resource_samples, 2);
    assert_eq!(report.failures, vec!["disk_io", "network_io"]);
    assert_eq!(store.series_len(ResourceKind::Memory), 1);
    assert_eq!(store.series_len(ResourceKind::Cpu), 1);
    assert_eq!(store.series_len(ResourceKind::DiskIo), 0);
    assert!(store.process_series(1).is_some());
}

#[test]
fn test_failing_process_list_keeps_resource_samples() {
    let provider = ScriptedProvider::new();
    provider.fail("processes");
    let store = RetentionStore::new();

    let report = sample_cycle(&provider, &store, Utc::now());

    assert_eq!(report.resource_samples, 4);
    assert_eq!(report.process_samples, 0);
    assert_eq!(report.failures, vec!["processes"]);
}

#[test]
fn test_exited_process_history_ages_out() {
    let provider = ScriptedProvider::new();
    provider.set_process(9, "short-lived", 1.0, 10);
    let store = RetentionStore::new();
    let start = Utc::now();

    sample_cycle(&provider, &store, start);
    provider.remove_process(9);
    sample_cycle(&provider, &store, start + chrono::Duration::minutes(61));

    assert!(store.process_series(9).is_none());
    assert_eq!(store.series_len(ResourceKind::Memory), 2);
}

#[tokio::test]
async fn test_run_samples_until_shutdown() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.set_process(1, "init", 0.5, 10);
    let store = Arc::new(RetentionStore::new());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (report_tx, mut report_rx) = watch::channel(None);

    let sampler = Sampler::new(Arc::clone(&provider), Arc::clone(&store))
        .with_period(Duration::from_millis(20))
        .with_reports(report_tx);
    let handle = tokio::spawn(sampler.run(shutdown_rx));

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(5), report_rx.changed())
            .await
            .expect("sampler produced no cycle")
            .unwrap();
    }

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("sampler did not stop")
        .unwrap();

    assert!(store.series_len(ResourceKind::Memory) >= 3);
    assert!(report_rx.borrow().is_some());
}

#[tokio::test]
async fn test_run_survives_panicking_cycle() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.set_process(1, "init", 0.5, 10);
    provider.panic_next_cycles(2);
    let store = Arc::new(RetentionStore::new());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (report_tx, mut report_rx) = watch::channel(None);

    let sampler = Sampler::new(Arc::clone(&provider), Arc::clone(&store))
        .with_period(Duration::from_millis(10))
        .with_reports(report_tx);
    let handle = tokio::spawn(sampler.run(shutdown_rx));

    tokio::time::timeout(Duration::from_secs(5), report_rx.changed())
        .await
        .expect("sampler never recovered")
        .unwrap();

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    assert!(store.process_series(1).is_some());
}
