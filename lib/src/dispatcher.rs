//! Dispatcher: waits for processes to become eligible and load-balances them onto cores
use crate::{
    context::SimulationContext, error::SimulationError, process::Process,
    processor::ProcessorBase, timer::UnblockTimer,
};
use log::{info, warn};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct Dispatcher<T: ProcessorBase> {
    processor: Arc<T>,
    /// Processes that have not arrived yet, ordered by (arrival_time, pid).
    pending_arrivals: VecDeque<Arc<Process>>,
}

impl<T: ProcessorBase> Dispatcher<T> {
    pub fn new(processes: &[Arc<Process>], processor: Arc<T>) -> Self {
        let mut sorted = processes.to_vec();
        sorted.sort_by_key(|process| (process.arrival_time(), process.pid()));
        Self {
            processor,
            pending_arrivals: sorted.into(),
        }
    }

    pub fn next_arrival_time(&self) -> Option<i32> {
        self.pending_arrivals
            .front()
            .map(|process| process.arrival_time())
    }

    fn has_due(&self, timer: &UnblockTimer, current_time: i32) -> bool {
        self.next_arrival_time()
            .is_some_and(|arrival_time| arrival_time <= current_time)
            || timer.has_due(current_time)
    }

    /// Collects everything eligible at `current_time`: new arrivals first, then
    /// unblocked processes, each group ordered by the time it became eligible.
    fn take_due(
        &mut self,
        timer: &UnblockTimer,
        current_time: i32,
    ) -> Result<Vec<(i32, Arc<Process>)>, SimulationError> {
        let mut due = Vec::new();
        while self
            .next_arrival_time()
            .is_some_and(|arrival_time| arrival_time <= current_time)
        {
            if let Some(process) = self.pending_arrivals.pop_front() {
                due.push((process.arrival_time(), process));
            }
        }
        due.extend(timer.fire_due(current_time)?);
        due.sort_by_key(|(eligible_time, _)| *eligible_time);
        Ok(due)
    }

    pub fn request(&mut self, ctx: &SimulationContext) -> Result<(), SimulationError> {
        info!("Dispatcher is running");
        while let Some(current_time) = ctx
            .clock
            .wait_until(|now| self.has_due(&ctx.timer, now))
        {
            for (_, process) in self.take_due(&ctx.timer, current_time)? {
                self.request_message(&process);
                if self.load_balancing(&process, current_time).is_none() {
                    return Err(SimulationError::NoCoreAvailable(process.pid()));
                }
                ctx.request_queue.push(process);
            }
            ctx.clock.notify();
        }
        info!("Dispatcher has stopped");
        Ok(())
    }

    fn request_message(&self, process: &Process) {
        info!(
            "Process '{}' requested CPU allocation. Burst time: {}ms",
            process.pid(),
            process.burst_time_remaining()
        );
    }

    /// Assigns the process to the least loaded core, lowest core id on ties.
    pub fn load_balancing(&self, process: &Process, current_time: i32) -> Option<usize> {
        let Some(core_id) = self.processor.get_least_loaded_core_index() else {
            warn!("No core available for process '{}'", process.pid());
            return None;
        };
        if !self.processor.allocate(core_id, process) {
            return None;
        }
        info!(
            "Process '{}' has been allocated to 'Core {}'. Allocation time: {}ms",
            process.pid(),
            core_id,
            current_time
        );
        Some(core_id)
    }
}
