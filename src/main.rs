use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use sysmon::commands;

fn build_cli() -> Command {
    let json_flag = Arg::new("json")
        .long("json")
        .help("Print machine-readable JSON")
        .action(ArgAction::SetTrue);

    Command::new("sysmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples system metrics, tracks history and flags resource alerts and memory leaks")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .subcommand(
            Command::new("overview")
                .about("Show a snapshot of CPU, memory, disk and network usage")
                .arg(json_flag.clone()),
        )
        .subcommand(
            Command::new("processes")
                .about("List running processes")
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .value_name("FIELD")
                        .help("Sort descending by memory_percent, cpu_percent, memory_bytes or pid")
                        .value_parser(["memory_percent", "cpu_percent", "memory_bytes", "pid"])
                        .default_value("memory_percent"),
                )
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("N")
                        .help("Maximum number of processes to show (default from config)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(json_flag.clone()),
        )
        .subcommand(
            Command::new("process")
                .about("Show details of one process")
                .arg(
                    Arg::new("pid")
                        .help("Process ID")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(json_flag.clone()),
        )
        .subcommand(
            Command::new("temps")
                .about("Show hardware temperature sensors")
                .arg(json_flag.clone()),
        )
        .subcommand(
            Command::new("battery")
                .about("Show battery charge and power source")
                .arg(json_flag.clone()),
        )
        .subcommand(
            Command::new("watch")
                .about("Sample continuously, reporting alerts and possible memory leaks")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECS")
                        .help("Seconds between sampling cycles (default from config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("leak-threshold")
                        .long("leak-threshold")
                        .value_name("MB")
                        .help("Resident memory a growing process must exceed to be reported")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("alerts")
                .about("Manage resource alerts (use 'sysmon alerts --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("show")
                        .about("Show thresholds and current alert status")
                        .arg(json_flag),
                )
                .subcommand(
                    Command::new("set")
                        .about("Set alert thresholds (all three are required, each 0-100)")
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .value_name("OBJECT")
                                .help("Read thresholds from a JSON object, e.g. '{\"cpu_threshold\": 80, ...}'")
                                .conflicts_with_all(["cpu", "memory", "disk", "disable"]),
                        )
                        .arg(
                            Arg::new("cpu")
                                .long("cpu")
                                .value_name("PERCENT")
                                .help("CPU usage threshold, 0-100")
                                .value_parser(clap::value_parser!(f32)),
                        )
                        .arg(
                            Arg::new("memory")
                                .long("memory")
                                .value_name("PERCENT")
                                .help("Memory usage threshold, 0-100")
                                .value_parser(clap::value_parser!(f32)),
                        )
                        .arg(
                            Arg::new("disk")
                                .long("disk")
                                .value_name("PERCENT")
                                .help("Disk usage threshold, 0-100")
                                .value_parser(clap::value_parser!(f32)),
                        )
                        .arg(
                            Arg::new("disable")
                                .long("disable")
                                .help("Store the thresholds but turn alerts off")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
}

fn main() -> Result<()> {
    sysmon::init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("version", _)) => commands::version()?,
        Some(("overview", sub_matches)) => commands::overview::execute(sub_matches)?,
        Some(("processes", sub_matches)) => commands::processes::execute_list(sub_matches)?,
        Some(("process", sub_matches)) => commands::processes::execute_show(sub_matches)?,
        Some(("temps", sub_matches)) => commands::sensors::execute_temperatures(sub_matches)?,
        Some(("battery", sub_matches)) => commands::sensors::execute_battery(sub_matches)?,
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches)?,
        Some(("alerts", sub_matches)) => commands::alerts::execute(sub_matches)?,
        _ => {
            println!("Welcome to sysmon!");
            println!("Use 'sysmon --help' for more information.");
        }
    }

    Ok(())
}
