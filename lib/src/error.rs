//! Error type shared by the simulation engine
use crate::process::ProcessStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("the number of schedulers ({schedulers}) should match the number of cores ({cores})")]
    SchedulerCountMismatch { schedulers: usize, cores: usize },

    #[error("the number of cores cannot exceed {max} (got {requested})")]
    TooManyCores { requested: usize, max: usize },

    #[error("at least one core is required")]
    NoCores,

    #[error("at least one process is required")]
    NoProcesses,

    #[error("the number of processes cannot exceed {max} (got {requested})")]
    TooManyProcesses { requested: usize, max: usize },

    #[error("process {pid} cannot be simulated: {reason}")]
    InvalidProcess { pid: usize, reason: &'static str },

    #[error("invalid burst time range [{min}, {max}]")]
    InvalidBurstRange { min: i32, max: i32 },

    #[error("the time quantum must be positive (got {0})")]
    InvalidTimeQuantum(i32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("process {pid} cannot move from {from} to {to}")]
    InvalidTransition {
        pid: usize,
        from: ProcessStatus,
        to: ProcessStatus,
    },

    #[error("no core can take process {0}")]
    NoCoreAvailable(usize),

    #[error("simulation unit '{0}' panicked")]
    UnitPanicked(String),

    #[error("the simulation is already running")]
    AlreadyRunning,

    #[error("an earlier run of this simulation failed: {0}")]
    PreviousRunFailed(String),
}
