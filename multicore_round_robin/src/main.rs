use clap::Parser;
use lib::config::SimulationConfig;
use lib::core::{SchedulingPolicy, DEFAULT_TIME_QUANTUM};
use lib::error::SimulationError;
use lib::output_log::dump_simulation_log_to_yaml;
use lib::simulator::Simulator;
use log::error;
use std::process::ExitCode;

#[derive(Parser)]
#[clap(
    name = "multicore_round_robin",
    version = "1.0",
    about = "About:
    Simulates round-robin scheduling of randomly generated processes on a multi-core processor.
    Processes are load-balanced onto the least loaded core and may block for simulated I/O.
    When a config file is given, its values override the command line."
)]
struct ArgParser {
    ///Number of processing cores.
    #[clap(short = 'c', long = "number_of_cores", default_value_t = 4)]
    number_of_cores: usize,
    ///Number of processes to generate.
    #[clap(short = 'p', long = "process_count", default_value_t = 16)]
    process_count: usize,
    ///Lower bound of the generated burst times.
    #[clap(long = "min_burst", default_value_t = 1)]
    min_burst: i32,
    ///Upper bound of the generated burst times.
    #[clap(long = "max_burst", default_value_t = 15)]
    max_burst: i32,
    ///Time quantum of every round-robin core.
    #[clap(short = 'q', long = "time_quantum", default_value_t = DEFAULT_TIME_QUANTUM)]
    time_quantum: i32,
    ///Wall-clock length of one simulated millisecond.
    #[clap(short = 't', long = "tick_interval_ms", default_value_t = 100)]
    tick_interval_ms: u64,
    ///Draw arrival times at random instead of pid order.
    #[clap(short = 'r', long = "random_arrival")]
    random_arrival: bool,
    ///Disable simulated I/O blocking.
    #[clap(long = "no_blocking")]
    no_blocking: bool,
    ///Seed for process generation and blocking.
    #[clap(short = 's', long = "seed")]
    seed: Option<u64>,
    ///Path to a YAML config file.
    #[clap(short = 'f', long = "config_file_path")]
    config_file_path: Option<String>,
    ///Path to output directory. Nothing is written when omitted.
    #[clap(short = 'o', long = "output_dir_path")]
    output_dir_path: Option<String>,
}

fn build_config(arg: &ArgParser) -> Result<SimulationConfig, SimulationError> {
    if let Some(config_file_path) = &arg.config_file_path {
        return SimulationConfig::from_yaml_file(config_file_path);
    }
    Ok(SimulationConfig {
        process_count: arg.process_count,
        burst_time_range: [arg.min_burst, arg.max_burst],
        number_of_cores: arg.number_of_cores,
        schedulers: vec![SchedulingPolicy::RoundRobin; arg.number_of_cores],
        random_arrival: arg.random_arrival,
        time_quantum: arg.time_quantum,
        tick_interval_ms: arg.tick_interval_ms,
        blocking: !arg.no_blocking,
        seed: arg.seed,
    })
}

fn simulate(arg: &ArgParser) -> Result<(), SimulationError> {
    let config = build_config(arg)?;
    let simulator = Simulator::new(config)?;
    let report = simulator.run()?;

    println!("{}", report.summary());
    println!("{}", report.render_chart());

    if let Some(output_dir_path) = &arg.output_dir_path {
        dump_simulation_log_to_yaml(output_dir_path, simulator.config(), &report)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let arg: ArgParser = ArgParser::parse();
    match simulate(&arg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Simulation failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
