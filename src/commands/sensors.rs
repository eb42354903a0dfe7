//! `sysmon temps` and `sysmon battery`.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{BatteryStatus, TemperatureReading};
use crate::core::Config;
use crate::ui::{format_uptime, truncate};

pub fn execute_temperatures(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let service = super::local_service(&config);
    let sensors = service
        .temperatures()
        .context("Failed to read temperature sensors")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&sensors)?);
        return Ok(());
    }

    if sensors.is_empty() {
        println!("{}", "No temperature sensors available".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<32} {:>9} {:>9} {:>9}", "SENSOR", "CURRENT", "MAX", "CRITICAL").bold()
    );
    for sensor in &sensors {
        print_sensor(sensor);
    }
    Ok(())
}

fn print_sensor(sensor: &TemperatureReading) {
    let celsius = |value: Option<f32>| {
        value
            .map(|v| format!("{:.1}°C", v))
            .unwrap_or_else(|| "-".to_string())
    };

    let current = celsius(sensor.current_celsius);
    let hot = matches!(
        (sensor.current_celsius, sensor.critical_celsius),
        (Some(current), Some(critical)) if current >= critical
    );

    println!(
        "{:<32} {:>9} {:>9} {:>9}",
        truncate(&sensor.label, 32),
        if hot { current.red().bold() } else { current.normal() },
        celsius(sensor.max_celsius),
        celsius(sensor.critical_celsius)
    );
}

pub fn execute_battery(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let service = super::local_service(&config);
    let status = service.battery().context("Failed to read battery state")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match status {
        Some(status) => print_battery(&status),
        None => println!("{}", "No battery information available".dimmed()),
    }
    Ok(())
}

fn print_battery(status: &BatteryStatus) {
    let source = match status.power_plugged {
        Some(true) => "plugged in".green(),
        Some(false) => "on battery".yellow(),
        None => "unknown".dimmed(),
    };

    println!("{}", "Battery".bold());
    println!("  Charge     {:.0}%", status.percent);
    println!("  Power      {}", source);
    if let Some(secs) = status.secs_left {
        println!("  Remaining  {}", format_uptime(secs));
    }
}
