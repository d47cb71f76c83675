//! Construction parameters of a simulation run
use crate::{
    core::{SchedulingPolicy, DEFAULT_TIME_QUANTUM},
    error::SimulationError,
};
use serde_derive::{Deserialize, Serialize};
use std::{fs, time::Duration};

pub const MAX_CORE_NUM: usize = 16;
pub const MAX_PROCESS_COUNT: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub process_count: usize,
    /// Inclusive `[min, max]` range burst times are drawn from.
    pub burst_time_range: [i32; 2],
    pub number_of_cores: usize,
    /// One policy per core. Left empty in a config file it means round-robin everywhere.
    #[serde(default)]
    pub schedulers: Vec<SchedulingPolicy>,
    pub random_arrival: bool,
    pub time_quantum: i32,
    pub tick_interval_ms: u64,
    pub blocking: bool,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(16, [1, 15], 4)
    }
}

impl SimulationConfig {
    pub fn new(process_count: usize, burst_time_range: [i32; 2], number_of_cores: usize) -> Self {
        Self {
            process_count,
            burst_time_range,
            number_of_cores,
            schedulers: vec![SchedulingPolicy::RoundRobin; number_of_cores],
            random_arrival: false,
            time_quantum: DEFAULT_TIME_QUANTUM,
            tick_interval_ms: 100,
            blocking: true,
            seed: None,
        }
    }

    /// load yaml file and return a config
    ///
    /// # Example
    ///
    /// ```yaml
    /// process_count: 8
    /// burst_time_range: [1, 15]
    /// number_of_cores: 2
    /// time_quantum: 5
    /// tick_interval_ms: 10
    /// seed: 7
    /// ```
    pub fn from_yaml_file(file_path: &str) -> Result<Self, SimulationError> {
        let contents = fs::read_to_string(file_path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimulationError> {
        let mut config: SimulationConfig = serde_yaml::from_str(yaml)?;
        if config.schedulers.is_empty() {
            config.schedulers = vec![SchedulingPolicy::RoundRobin; config.number_of_cores];
        }
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.schedulers.len() != self.number_of_cores {
            return Err(SimulationError::SchedulerCountMismatch {
                schedulers: self.schedulers.len(),
                cores: self.number_of_cores,
            });
        }
        if self.number_of_cores > MAX_CORE_NUM {
            return Err(SimulationError::TooManyCores {
                requested: self.number_of_cores,
                max: MAX_CORE_NUM,
            });
        }
        if self.number_of_cores == 0 {
            return Err(SimulationError::NoCores);
        }
        if self.process_count == 0 {
            return Err(SimulationError::NoProcesses);
        }
        if self.process_count > MAX_PROCESS_COUNT {
            return Err(SimulationError::TooManyProcesses {
                requested: self.process_count,
                max: MAX_PROCESS_COUNT,
            });
        }
        let [min, max] = self.burst_time_range;
        if min < 1 || min > max {
            return Err(SimulationError::InvalidBurstRange { min, max });
        }
        if self.time_quantum < 1 {
            return Err(SimulationError::InvalidTimeQuantum(self.time_quantum));
        }
        Ok(())
    }
}
