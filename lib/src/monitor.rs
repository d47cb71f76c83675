//! Raises the end signal once every process has completed
use crate::{clock::Clock, process::Process};
use log::{debug, info};
use std::sync::Arc;

pub struct TerminationMonitor {
    processes: Vec<Arc<Process>>,
}

impl TerminationMonitor {
    pub fn new(processes: &[Arc<Process>]) -> Self {
        Self {
            processes: processes.to_vec(),
        }
    }

    pub fn all_completed(&self) -> bool {
        self.processes.iter().all(|process| process.is_completed())
    }

    /// Re-checks every process status on each clock wakeup. Returns true if this
    /// monitor raised the end signal, false if someone else ended the run first.
    pub fn end_check(&self, clock: &Clock) -> bool {
        let mut last_checked = None;
        let finished = clock.wait_until(|now| {
            if last_checked != Some(now) {
                last_checked = Some(now);
                let statuses: Vec<String> = self
                    .processes
                    .iter()
                    .map(|process| process.status().to_string())
                    .collect();
                debug!("Status Check at {}ms: {}", now, statuses.join(" "));
            }
            self.all_completed()
        });
        if finished.is_none() {
            return false;
        }
        info!("All processes have finished execution.");
        clock.raise_end_signal()
    }
}
