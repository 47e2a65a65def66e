use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use clap::Parser;
use log::info;
use hierlib::config::HierarchyConfig;
use hierlib::frequency::FrequencyTracker;
use hierlib::io::get_reader;
use hierlib::simulator::Simulator;
use hierlib::stats::HierarchyReport;
use hierlib::trace::standard_workload;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Two level cache hierarchy simulator"))]
struct Args {
    /// Text trace of `R <addr>` / `W <addr>` lines. Runs the built-in workload when omitted
    trace: Option<String>,

    /// JSON hierarchy configuration. Uses the reference geometry when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Print reports as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let start = Instant::now();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {path}");
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
            HierarchyConfig::from_reader(BufReader::new(config_file)).map_err(|e| format!("Invalid config file {path}: {e}"))?
        }
        None => HierarchyConfig::default(),
    };
    let mut simulator = Simulator::new(&config).map_err(|e| format!("Invalid configuration: {e}"))?;
    match &args.trace {
        Some(path) => {
            info!("Simulating trace {path}");
            let trace_file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {path}: {e}"))?;
            let trace_reader = get_reader(trace_file).map_err(|e| format!("Couldn't read the trace file: {e}"))?;
            let report = simulator.simulate_reader(trace_reader).map_err(|e| format!("Couldn't simulate {path}: {e}"))?;
            print_report(None, &report, args.json)?;
        }
        None => {
            info!("No trace given, running the built-in workload");
            for phase in standard_workload() {
                let report = simulator.run_phase(&phase);
                print_report(Some(phase.name), &report, args.json)?;
            }
        }
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulated events: {}", simulator.get_event_count());
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        let uninitialised_lines = simulator.get_uninitialised_line_counts();
        let formatted = ["L1", "L2"]
            .iter()
            .zip(uninitialised_lines.iter())
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Uninitialised cache lines by level: ({formatted})");
        println!("Total uninitialised cache lines: {}", uninitialised_lines.iter().sum::<u64>());
        let hierarchy = simulator.hierarchy();
        println!("L2 layout: {} sets of {} ways", hierarchy.l2().num_sets(), hierarchy.l2().ways());
        for buffer in [hierarchy.victim_buffer(), hierarchy.write_buffer(), hierarchy.prefetch_buffer()] {
            println!("{} buffer occupancy: {}/{}", buffer.name(), buffer.len(), buffer.capacity());
        }
        println!("Blocks tracked for prefetch admission: {}", hierarchy.frequency().tracked());
    }
    Ok(())
}

fn print_report(phase: Option<&str>, report: &HierarchyReport, json: bool) -> Result<(), String> {
    if json {
        let value = match phase {
            Some(name) => serde_json::json!({ "phase": name, "report": report }),
            None => serde_json::json!(report),
        };
        println!("{}", serde_json::to_string_pretty(&value).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        if let Some(name) = phase {
            println!("Simulating {name}:");
        }
        println!("{report}");
    }
    Ok(())
}
