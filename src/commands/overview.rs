//! `sysmon overview`: one snapshot of the machine.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::Config;
use crate::ui::{format_bytes, format_percent, format_time, format_uptime, truncate};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let service = super::local_service(&config);

    let snapshot = service.overview().context("Failed to read system metrics")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let thresholds = config.alerts;

    println!("{}", "System overview".bold());
    println!("  Captured   {}", format_time(snapshot.timestamp));
    if let Some(boot) = snapshot.boot_time {
        println!(
            "  Uptime     {} (booted {})",
            format_uptime(snapshot.uptime_secs),
            format_time(boot)
        );
    }
    println!("  Processes  {}", snapshot.process_count);
    println!();

    println!("{}", "CPU".bold());
    if let Some(info) = &snapshot.cpu_info {
        let physical = info
            .physical_cores
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  Model      {} ({} physical / {} logical, {} MHz)",
            info.brand, physical, snapshot.logical_cores, info.frequency_mhz
        );
    }
    println!(
        "  Average    {} across {} cores",
        format_percent(snapshot.cpu.average_percent, thresholds.cpu_threshold),
        snapshot.logical_cores
    );
    for (i, usage) in snapshot.cpu.per_core_percent.iter().enumerate() {
        println!(
            "  Core {:<4}  {}",
            i,
            format_percent(*usage, thresholds.cpu_threshold)
        );
    }
    println!();

    println!("{}", "Memory".bold());
    println!(
        "  Used       {} of {} ({})",
        format_bytes(snapshot.memory.used_bytes),
        format_bytes(snapshot.memory.total_bytes),
        format_percent(snapshot.memory.percent, thresholds.memory_threshold)
    );
    println!(
        "  Available  {}",
        format_bytes(snapshot.memory.available_bytes)
    );
    if let Some(swap) = snapshot.swap {
        println!(
            "  Swap       {} of {} ({:.1}%)",
            format_bytes(swap.used_bytes),
            format_bytes(swap.total_bytes),
            swap.percent
        );
    }
    println!();

    println!("{}", "Disk".bold());
    match snapshot.disk_usage_percent {
        Some(percent) => println!(
            "  Usage      {}",
            format_percent(percent, thresholds.disk_threshold)
        ),
        None => println!("  Usage      {}", "n/a".dimmed()),
    }
    for part in &snapshot.partitions {
        println!(
            "  {:<10} {} of {} ({}) {} {}",
            truncate(&part.mount_point, 10),
            format_bytes(part.used_bytes),
            format_bytes(part.total_bytes),
            format_percent(part.percent, thresholds.disk_threshold),
            part.file_system.dimmed(),
            part.device.dimmed()
        );
    }
    if let Some(io) = snapshot.disk_io {
        println!(
            "  I/O        read {} / written {}",
            format_bytes(io.read_bytes),
            format_bytes(io.write_bytes)
        );
    }
    println!();

    if let Some(net) = snapshot.network_io {
        println!("{}", "Network".bold());
        println!(
            "  I/O        sent {} / received {}",
            format_bytes(net.bytes_sent),
            format_bytes(net.bytes_recv)
        );
    }

    Ok(())
}
