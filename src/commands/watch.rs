//! `sysmon watch`: run the sampler in the foreground.
//!
//! After every sampling cycle prints the alert status and any leak
//! candidates. Ctrl-C stops the sampler cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{
    CycleReport, LeakReport, LeakSeverity, MonitorRuntime, MonitorService, ResourceReading,
    SysinfoProvider,
};
use crate::core::Config;
use crate::ui::{format_time, truncate};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.sample_interval_secs = *interval;
    }
    let leak_threshold = matches.get_one::<f64>("leak-threshold").copied();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl-C handler")?;

    let mut runtime = MonitorRuntime::start(&config).context("Failed to start monitor")?;

    println!(
        "{} Sampling every {}s, press Ctrl-C to stop",
        "●".green(),
        config.sample_interval().as_secs()
    );

    while running.load(Ordering::SeqCst) {
        match runtime.wait_for_cycle(Duration::from_millis(500)) {
            Ok(Some(report)) => print_cycle(runtime.service(), &report, leak_threshold),
            Ok(None) => {}
            Err(e) => {
                log::error!("{}", e);
                break;
            }
        }
    }

    println!();
    print_history_summary(runtime.service());
    runtime.shutdown();

    Ok(())
}

fn print_cycle(
    service: &MonitorService<SysinfoProvider>,
    report: &CycleReport,
    leak_threshold: Option<f64>,
) {
    println!(
        "{} {} resource samples, {} processes{}",
        format_time(report.timestamp).dimmed(),
        report.resource_samples,
        report.process_samples,
        if report.failures.is_empty() {
            String::new()
        } else {
            format!(" (skipped: {})", report.failures.join(", ")).yellow().to_string()
        }
    );

    match service.alert_status() {
        Ok(alerts) => {
            for alert in &alerts.alerts {
                println!("  {} {}", "⚠".red(), alert.message);
            }
        }
        Err(e) => log::warn!("Could not evaluate alerts: {}", e),
    }

    print_leaks(&service.detect_leaks(leak_threshold));
}

fn print_leaks(report: &LeakReport) {
    if report.leak_report.is_empty() {
        return;
    }

    let memory_trend = report
        .memory_trend
        .iter()
        .filter_map(|sample| match &sample.reading {
            ResourceReading::Memory(memory) => Some(format!("{:.1}%", memory.percent)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("  {} {}", "System memory:".dimmed(), memory_trend);

    for candidate in &report.leak_report {
        let trend = candidate
            .trend
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect::<Vec<_>>()
            .join(" → ");
        let line = format!(
            "  Possible leak: {} (PID {}) at {:.1} MB, trend {}",
            truncate(&candidate.name, 32),
            candidate.pid,
            candidate.memory_mb,
            trend
        );
        match candidate.severity {
            LeakSeverity::High => println!("{}", line.red().bold()),
            LeakSeverity::Elevated => println!("{}", line.yellow()),
        }
    }
}

fn print_history_summary(service: &MonitorService<SysinfoProvider>) {
    let history = service.history(1);
    println!("{}", "Last hour".bold());
    println!("  memory   {} samples", history.memory.len());
    println!("  cpu      {} samples", history.cpu.len());
    println!("  disk_io  {} samples", history.disk_io.len());
    println!("  network  {} samples", history.network.len());
    println!(
        "  tracking {} processes",
        service.store().tracked_process_count()
    );
}
