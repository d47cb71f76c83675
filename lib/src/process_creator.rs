//! Generate the initial process pool of a simulation run
use crate::{config::SimulationConfig, process::Process};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

/// Random arrival times are drawn from `[0, process_count * RANDOM_ARRIVAL_FACTOR]`.
pub const RANDOM_ARRIVAL_FACTOR: i32 = 5;

/// create the processes described by the config
///
/// # Arguments
///
/// *  `config` - process count, burst time range, arrival mode and seed
///
/// # Returns
///
/// *  `processes` - pids run from 1 to `process_count`; sequential arrivals put
///    process `i` at time `i`
///
/// # Example
///
/// ```
/// use lib::config::SimulationConfig;
/// use lib::process_creator::create_processes;
///
/// let mut config = SimulationConfig::new(3, [2, 4], 1);
/// config.seed = Some(1);
/// let processes = create_processes(&config);
/// assert_eq!(processes.len(), 3);
/// assert_eq!(processes[2].arrival_time(), 3);
/// ```
pub fn create_processes(config: &SimulationConfig) -> Vec<Arc<Process>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let [min_burst, max_burst] = config.burst_time_range;
    let max_arrival = i32::try_from(config.process_count)
        .unwrap_or(i32::MAX)
        .saturating_mul(RANDOM_ARRIVAL_FACTOR);

    (1..=config.process_count)
        .map(|pid| {
            let burst_time = rng.gen_range(min_burst..=max_burst);
            let arrival_time = if config.random_arrival {
                rng.gen_range(0..=max_arrival)
            } else {
                pid as i32
            };
            Arc::new(Process::new(pid, arrival_time, burst_time))
        })
        .collect()
}

/// Builds processes from explicit `(arrival_time, burst_time)` pairs, pids starting at 1.
pub fn create_processes_from_params(params: &[(i32, i32)]) -> Vec<Arc<Process>> {
    params
        .iter()
        .enumerate()
        .map(|(i, &(arrival_time, burst_time))| {
            Arc::new(Process::new(i + 1, arrival_time, burst_time))
        })
        .collect()
}
