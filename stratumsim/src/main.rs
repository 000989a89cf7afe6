use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use clap::Parser;
use log::{debug, info};
use stratumlib::config::HierarchyConfig;
use stratumlib::io::read_trace;
use stratumlib::report::{aggregate, AccessLog};
use stratumlib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Simulates a trace of loads and stores through a memory hierarchy"))]
struct Args {
    /// JSON hierarchy configuration
    config: String,
    /// Trace file, one `L <address>` or `S <address>` per line
    trace: String,

    /// Print the aggregated report as JSON instead of a table
    #[arg(short, long)]
    json: bool,

    /// Print the level and latency of every access
    #[arg(long)]
    history: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,

    /// Log at debug level, unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config_file = File::open(&args.config).map_err(|e| format!("Couldn't open the config file at path {}: {e}", args.config))?;
    let config: HierarchyConfig = serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?;
    debug!("Parsed input configuration: {config:?}");
    let mut simulator = Simulator::from_config(&config).map_err(|e| format!("Invalid hierarchy configuration: {e}"))?;
    let accesses = read_trace(&args.trace).map_err(|e| format!("Couldn't load the trace file at path {}: {e}", args.trace))?;
    info!("Simulating {} accesses", accesses.len());
    simulator.simulate(accesses.iter().copied());

    let report = aggregate(simulator.results(), simulator.level_names());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        print!("{report}");
    }
    if args.history {
        print!("{}", AccessLog::new(&accesses, simulator.results()));
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        for stats in simulator.level_stats() {
            println!("Cache {}: Hits={}, Misses={}, Evictions={}", stats.name, stats.hits, stats.misses, stats.evictions);
        }
        let uninitialised_lines = simulator.get_uninitialised_line_counts();
        let formatted = simulator
            .level_stats()
            .into_iter()
            .map(|stats| stats.name)
            .zip(uninitialised_lines.iter())
            .map(|(name, count)| format!("{name}: {}", *count))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Uninitialised cache lines by layer: ({formatted})");
        println!("Total uninitialised cache lines: {}", uninitialised_lines.iter().sum::<u64>())
    }
    Ok(())
}
