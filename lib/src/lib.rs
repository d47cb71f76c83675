pub mod blocking;
pub mod chart;
pub mod clock;
pub mod config;
pub mod context;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod homogeneous;
pub mod monitor;
pub mod output_log;
pub mod process;
pub mod process_creator;
pub mod processor;
pub mod report;
pub mod request_queue;
pub mod simulator;
pub mod timer;
