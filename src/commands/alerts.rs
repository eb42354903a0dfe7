//! `sysmon alerts show|set`: persisted alert thresholds and current status.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{AlertConfig, AlertConfigUpdate, AlertReport};
use crate::core::Config;
use crate::ui::format_percent;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => execute_show(sub_matches),
        Some(("set", sub_matches)) => execute_set(sub_matches),
        _ => {
            println!("Use 'sysmon alerts --help' for more information.");
            Ok(())
        }
    }
}

fn execute_show(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let service = super::local_service(&config);
    let report = service
        .alert_status()
        .context("Failed to evaluate alert status")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn execute_set(matches: &ArgMatches) -> Result<()> {
    let update = match matches.get_one::<String>("json") {
        Some(body) => {
            let value: serde_json::Value =
                serde_json::from_str(body).context("Alert configuration is not valid JSON")?;
            AlertConfigUpdate::from_json(&value)?
        }
        None => AlertConfigUpdate {
            cpu_threshold: matches.get_one::<f32>("cpu").copied(),
            memory_threshold: matches.get_one::<f32>("memory").copied(),
            disk_threshold: matches.get_one::<f32>("disk").copied(),
            enabled: Some(!matches.get_flag("disable")),
        },
    };

    let mut config = Config::load()?;
    config.alerts = update.validate()?;
    config.save()?;

    println!("{} Alert configuration updated", "✓".green());
    print_config(&config.alerts);
    Ok(())
}

pub(crate) fn print_config(config: &AlertConfig) {
    let state = if config.enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!(
        "  Thresholds  cpu {:.1}%  memory {:.1}%  disk {:.1}%  ({})",
        config.cpu_threshold, config.memory_threshold, config.disk_threshold, state
    );
}

pub(crate) fn print_report(report: &AlertReport) {
    println!("{}", "Alert status".bold());
    print_config(&report.config);
    println!(
        "  Current     cpu {}  memory {}  disk {}",
        format_percent(report.usage.cpu_percent, report.config.cpu_threshold),
        format_percent(report.usage.memory_percent, report.config.memory_threshold),
        format_percent(report.usage.disk_percent, report.config.disk_threshold)
    );

    if report.alerts.is_empty() {
        println!("  {} All resources within thresholds", "✓".green());
    } else {
        for alert in &report.alerts {
            println!("  {} {}", "⚠".red(), alert.message);
        }
    }
}
