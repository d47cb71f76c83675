//! This module contains the definition of the core, its puller and its round-robin scheduler
use crate::{
    blocking::BlockingModel, clock::Clock, context::SimulationContext, error::SimulationError,
    process::Process,
};
use getset::CopyGetters;
use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DEFAULT_TIME_QUANTUM: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    #[default]
    RoundRobin,
}

///enum to represent how a slice ended
///finished, preempted at the quantum boundary, blocked at the quantum boundary
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ProcessResult {
    Done { completion_time: i32 },
    Continue { end_time: i32 },
    Blocked { end_time: i32, next_active_time: i32 },
}

impl ProcessResult {
    /// Time at which the core becomes free again.
    pub fn end_time(&self) -> i32 {
        match *self {
            ProcessResult::Done { completion_time } => completion_time,
            ProcessResult::Continue { end_time } => end_time,
            ProcessResult::Blocked { end_time, .. } => end_time,
        }
    }
}

#[derive(Debug, CopyGetters)]
pub struct Core {
    #[getset(get_copy = "pub")]
    core_id: usize,
    #[getset(get_copy = "pub")]
    scheduler: SchedulingPolicy,
    ready_queue: Mutex<VecDeque<Arc<Process>>>,
    current_load: AtomicUsize,
    total_processed: AtomicUsize,
}

impl Core {
    pub fn new(core_id: usize, scheduler: SchedulingPolicy) -> Self {
        Self {
            core_id,
            scheduler,
            ready_queue: Mutex::new(VecDeque::new()),
            current_load: AtomicUsize::new(0),
            total_processed: AtomicUsize::new(0),
        }
    }

    /// Number of processes currently owned by this core.
    pub fn load(&self) -> usize {
        self.current_load.load(Ordering::SeqCst)
    }

    pub fn total_load(&self) -> usize {
        self.total_processed.load(Ordering::SeqCst)
    }

    pub fn ready_queue_len(&self) -> usize {
        self.ready_queue.lock().expect("ready queue lock poisoned").len()
    }

    /// Called by the load balancer when a process is assigned to this core.
    pub fn reserve_load(&self) {
        self.current_load.fetch_add(1, Ordering::SeqCst);
    }

    /// Called when a process leaves this core, either completed or blocked.
    pub fn release_load(&self) {
        if self
            .current_load
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |load| {
                load.checked_sub(1)
            })
            .is_err()
        {
            warn!("Core {} released a load it does not hold", self.core_id);
        }
    }

    pub fn place_in_readyq(&self, process: &Arc<Process>) -> Result<(), SimulationError> {
        process.set_ready()?;
        self.ready_queue
            .lock()
            .expect("ready queue lock poisoned")
            .push_back(Arc::clone(process));
        Ok(())
    }

    fn next_ready(&self, clock: &Clock) -> Option<Arc<Process>> {
        let mut next = None;
        clock.wait_until(|_| {
            next = self
                .ready_queue
                .lock()
                .expect("ready queue lock poisoned")
                .pop_front();
            next.is_some()
        })?;
        next
    }

    /// Moves processes assigned to this core from the request queue into the ready queue.
    pub fn pull(&self, ctx: &SimulationContext) -> Result<(), SimulationError> {
        loop {
            let mut pulled = Vec::new();
            let waited = ctx.clock.wait_until(|_| {
                pulled = ctx.request_queue.take_assigned(self.core_id);
                !pulled.is_empty()
            });
            if waited.is_none() {
                break;
            }
            for process in pulled.iter() {
                info!("'Core {}' pulled 'Process {}'", self.core_id, process.pid());
                self.place_in_readyq(process)?;
            }
            ctx.clock.notify();
        }
        info!("'Core {}' has stopped pulling", self.core_id);
        Ok(())
    }

    pub fn run(
        &self,
        ctx: &SimulationContext,
        blocking: &mut BlockingModel,
    ) -> Result<(), SimulationError> {
        info!(
            "Core '{}' is running with random blocking {}",
            self.core_id,
            if blocking.is_enabled() { "on" } else { "off" }
        );
        match self.scheduler {
            SchedulingPolicy::RoundRobin => self.round_robin(ctx, blocking)?,
        }
        info!("Core '{}' has finished all of its tasks", self.core_id);
        Ok(())
    }

    pub fn round_robin(
        &self,
        ctx: &SimulationContext,
        blocking: &mut BlockingModel,
    ) -> Result<(), SimulationError> {
        let mut free_at = 0;
        while let Some(process) = self.next_ready(&ctx.clock) {
            debug!("Core {} - RR: got process: {}", self.core_id, process.pid());
            process.run()?;
            // A slice never starts before the process is eligible or before the core is free.
            let start = process.last_boundary().max(free_at);
            if ctx.clock.wait_until(|now| now >= start).is_none() {
                break;
            }
            let Some(result) = self.execute_slice(ctx, &process, start, blocking)? else {
                break;
            };
            if let ProcessResult::Blocked {
                end_time,
                next_active_time,
            } = result
            {
                info!(
                    "Process {} has been blocked at {}ms until {}ms",
                    process.pid(),
                    end_time,
                    next_active_time
                );
            }
            free_at = result.end_time();
        }
        Ok(())
    }

    /// Runs one slice starting at `start`. Returns `None` if the end signal
    /// was raised before the slice boundary was reached.
    fn execute_slice(
        &self,
        ctx: &SimulationContext,
        process: &Arc<Process>,
        start: i32,
        blocking: &mut BlockingModel,
    ) -> Result<Option<ProcessResult>, SimulationError> {
        let pid = process.pid();
        let time_quantum = ctx.time_quantum;
        let remaining = process.burst_time_remaining();

        if remaining <= time_quantum {
            ctx.chart
                .record_in_chart(self.core_id, pid, start, start + remaining);
            self.release_load();
            self.total_processed.fetch_add(1, Ordering::SeqCst);
            let completion_time = process.calc_times(start);
            if ctx
                .clock
                .wait_until(|now| now >= completion_time)
                .is_none()
            {
                return Ok(None);
            }
            process.set_completed()?;
            info!("Core {} - RR: Process '{}' has been finished", self.core_id, pid);
            process.completion_message(self.core_id);
            ctx.clock.notify();
            return Ok(Some(ProcessResult::Done { completion_time }));
        }

        debug!("Core {} - RR: Process '{}' has not been finished", self.core_id, pid);
        let end_time = start + time_quantum;
        let remaining = process.consume_quantum(time_quantum, end_time);
        debug!(
            "Core {} - RR: Process '{}'s remaining time: {}ms",
            self.core_id, pid, remaining
        );
        ctx.chart.record_in_chart(self.core_id, pid, start, end_time);
        if ctx.clock.wait_until(|now| now >= end_time).is_none() {
            return Ok(None);
        }

        if let Some(block_time) = blocking.random_block(process.burst_time(), remaining) {
            let next_active_time = end_time + block_time;
            process.block(next_active_time, block_time)?;
            self.release_load();
            ctx.timer.register(next_active_time, Arc::clone(process));
            ctx.clock.notify();
            return Ok(Some(ProcessResult::Blocked {
                end_time,
                next_active_time,
            }));
        }

        self.place_in_readyq(process)?;
        debug!(
            "Core {} - RR: Process '{}' is back in ready queue",
            self.core_id, pid
        );
        Ok(Some(ProcessResult::Continue { end_time }))
    }
}
