//! This module contains the definition of the process and its status state machine
use crate::error::SimulationError;
use getset::CopyGetters;
use log::info;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Value of a timing field that has not been computed yet.
pub const UNSET_TIME: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Created,
    Ready,
    Running,
    Blocked,
    Unblocked,
    Completed,
}

impl ProcessStatus {
    /// Returns true if `self -> next` is an edge of the process state machine.
    ///
    /// ```text
    /// Created -> Ready -> Running -> Completed
    ///              ^        |  |
    ///              +--------+  +-> Blocked -> Unblocked -> Ready
    /// ```
    pub fn can_transition_to(self, next: ProcessStatus) -> bool {
        use ProcessStatus::*;
        matches!(
            (self, next),
            (Created, Ready)
                | (Ready, Running)
                | (Running, Ready)
                | (Running, Blocked)
                | (Running, Completed)
                | (Blocked, Unblocked)
                | (Unblocked, Ready)
        )
    }

    /// A core may only pull processes that are waiting for their first or next assignment.
    pub fn is_pullable(self) -> bool {
        matches!(self, ProcessStatus::Created | ProcessStatus::Unblocked)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessStatus::Created => "CREATED",
            ProcessStatus::Ready => "READY",
            ProcessStatus::Running => "RUNNING",
            ProcessStatus::Blocked => "BLOCKED",
            ProcessStatus::Unblocked => "UNBLOCKED",
            ProcessStatus::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// Mutable part of a process. Only one component touches it at a time and
/// always through the process lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessState {
    pub status: ProcessStatus,
    pub assigned_core: Option<usize>,
    pub burst_time_remaining: i32,
    pub completion_time: i32,
    pub turnaround_time: i32,
    pub waiting_time: i32,
    pub next_active_time: i32,
    /// Earliest logical time of the next slice.
    pub last_boundary: i32,
}

#[derive(Debug, CopyGetters)]
pub struct Process {
    #[getset(get_copy = "pub")]
    pid: usize,
    #[getset(get_copy = "pub")]
    arrival_time: i32,
    #[getset(get_copy = "pub")]
    burst_time: i32,
    state: Mutex<ProcessState>,
}

impl Process {
    pub fn new(pid: usize, arrival_time: i32, burst_time: i32) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            state: Mutex::new(ProcessState {
                status: ProcessStatus::Created,
                assigned_core: None,
                burst_time_remaining: burst_time,
                completion_time: UNSET_TIME,
                turnaround_time: UNSET_TIME,
                waiting_time: 0,
                next_active_time: 0,
                last_boundary: arrival_time,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().expect("process state lock poisoned")
    }

    pub fn snapshot(&self) -> ProcessState {
        self.state().clone()
    }

    pub fn status(&self) -> ProcessStatus {
        self.state().status
    }

    pub fn assigned_core(&self) -> Option<usize> {
        self.state().assigned_core
    }

    pub fn burst_time_remaining(&self) -> i32 {
        self.state().burst_time_remaining
    }

    pub fn last_boundary(&self) -> i32 {
        self.state().last_boundary
    }

    pub fn is_completed(&self) -> bool {
        self.status() == ProcessStatus::Completed
    }

    /// True while the process is exactly as `Process::new` left it.
    pub fn is_fresh(&self) -> bool {
        let state = self.state();
        state.status == ProcessStatus::Created
            && state.assigned_core.is_none()
            && state.burst_time_remaining == self.burst_time
            && state.waiting_time == 0
            && state.completion_time == UNSET_TIME
            && state.last_boundary == self.arrival_time
    }

    fn transition(
        &self,
        state: &mut ProcessState,
        next: ProcessStatus,
    ) -> Result<(), SimulationError> {
        if !state.status.can_transition_to(next) {
            return Err(SimulationError::InvalidTransition {
                pid: self.pid,
                from: state.status,
                to: next,
            });
        }
        state.status = next;
        Ok(())
    }

    pub fn assign_core(&self, core_id: usize) {
        self.state().assigned_core = Some(core_id);
    }

    /// Moves the process into the ready state and returns the status it left.
    pub fn set_ready(&self) -> Result<ProcessStatus, SimulationError> {
        let mut state = self.state();
        let previous = state.status;
        self.transition(&mut state, ProcessStatus::Ready)?;
        Ok(previous)
    }

    pub fn run(&self) -> Result<(), SimulationError> {
        let mut state = self.state();
        self.transition(&mut state, ProcessStatus::Running)
    }

    /// Charges one full quantum ending at `boundary` and returns the remaining burst time.
    pub fn consume_quantum(&self, quantum: i32, boundary: i32) -> i32 {
        let mut state = self.state();
        state.burst_time_remaining -= quantum;
        state.last_boundary = boundary;
        state.burst_time_remaining
    }

    /// Runs the remaining burst from `start` to the end and fills in the final metrics.
    /// Returns the completion time.
    pub fn calc_times(&self, start: i32) -> i32 {
        let mut state = self.state();
        state.completion_time = start + state.burst_time_remaining;
        state.waiting_time += state.completion_time - self.arrival_time - self.burst_time;
        if state.waiting_time < 0 {
            state.waiting_time = 0;
        }
        state.turnaround_time = state.waiting_time + self.burst_time;
        state.burst_time_remaining = 0;
        state.last_boundary = state.completion_time;
        state.completion_time
    }

    pub fn set_completed(&self) -> Result<(), SimulationError> {
        let mut state = self.state();
        self.transition(&mut state, ProcessStatus::Completed)
    }

    pub fn block(&self, next_active_time: i32, block_time: i32) -> Result<(), SimulationError> {
        let mut state = self.state();
        self.transition(&mut state, ProcessStatus::Blocked)?;
        state.assigned_core = None;
        state.next_active_time = next_active_time;
        state.last_boundary = next_active_time;
        state.waiting_time += block_time;
        Ok(())
    }

    pub fn unblock(&self) -> Result<(), SimulationError> {
        let mut state = self.state();
        self.transition(&mut state, ProcessStatus::Unblocked)
    }

    pub fn completion_message(&self, core_id: usize) {
        let state = self.state();
        info!(
            "Process '{}' is terminated normally in Core '{}' at {}ms after {}ms",
            self.pid, core_id, state.completion_time, state.turnaround_time
        );
    }
}
