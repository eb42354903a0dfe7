//! `sysmon processes` and `sysmon process <PID>`.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{ProcessDetails, ProcessSortKey};
use crate::core::Config;
use crate::error::MonitorError;
use crate::ui::{format_bytes, format_time, truncate};

pub fn execute_list(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;

    let sort_by: ProcessSortKey = matches
        .get_one::<String>("sort")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();
    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(config.top_processes);

    let service = super::local_service(&config);
    let processes = service
        .processes(sort_by, limit)
        .context("Failed to list processes")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&processes)?);
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:>8}  {:<24} {:>7} {:>7} {:>11}  {:<10}",
            "PID", "NAME", "CPU%", "MEM%", "RSS", "STATUS"
        )
        .bold()
    );
    for proc in &processes {
        println!(
            "{:>8}  {:<24} {:>7.1} {:>7.1} {:>11}  {:<10}",
            proc.pid,
            truncate(&proc.name, 24),
            proc.cpu_percent,
            proc.memory_percent,
            format_bytes(proc.memory_bytes),
            proc.status
        );
    }

    Ok(())
}

pub fn execute_show(matches: &ArgMatches) -> Result<()> {
    let pid = *matches
        .get_one::<u32>("pid")
        .context("PID argument is required")?;

    let config = Config::load()?;
    let service = super::local_service(&config);

    let details = match service.process(pid) {
        Ok(details) => details,
        Err(MonitorError::NotFound(_)) => {
            eprintln!("{} Process {} not found", "✗".red(), pid);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to query process"),
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    print_details(&details);
    Ok(())
}

fn print_details(details: &ProcessDetails) {
    println!("{} {}", "Process".bold(), details.pid.to_string().cyan());
    println!("  Name      {}", details.name);
    println!("  Status    {}", details.status);
    println!("  User      {}", details.username.as_deref().unwrap_or("-"));
    println!("  CPU       {:.1}%", details.cpu_percent);
    println!(
        "  Memory    {} ({:.2}%)",
        format_bytes(details.memory_bytes),
        details.memory_percent
    );
    if let Some(threads) = details.num_threads {
        println!("  Threads   {}", threads);
    }
    if let Some(started) = details.start_time {
        println!("  Started   {}", format_time(started));
    }
    if !details.cmdline.is_empty() {
        println!("  Command   {}", details.cmdline.dimmed());
    }
}
