//! Logical system clock with a broadcast wakeup and the shared end signal
use log::{debug, info};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
struct ClockState {
    current_time: i32,
    end_signal: bool,
}

/// Every blocking wait of the simulation goes through [`Clock::wait_until`].
/// Predicates may lock other shared structures, so nobody may call into the
/// clock while holding one of those locks.
#[derive(Debug, Default)]
pub struct Clock {
    state: Mutex<ClockState>,
    tick: Condvar,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().expect("clock state lock poisoned")
    }

    pub fn current_time(&self) -> i32 {
        self.state().current_time
    }

    pub fn is_ended(&self) -> bool {
        self.state().end_signal
    }

    /// Moves time forward by one tick and wakes every waiter.
    /// Returns false without advancing once the end signal is raised.
    pub fn advance(&self) -> bool {
        let mut state = self.state();
        if state.end_signal {
            return false;
        }
        state.current_time += 1;
        debug!("current_time: {}ms", state.current_time);
        drop(state);
        self.tick.notify_all();
        true
    }

    /// Wakes every waiter so it re-checks its predicate without a tick.
    pub fn notify(&self) {
        let _state = self.state();
        self.tick.notify_all();
    }

    /// Blocks until `predicate(current_time)` holds and returns that time.
    /// Returns `None` if the end signal is raised first.
    pub fn wait_until<F>(&self, mut predicate: F) -> Option<i32>
    where
        F: FnMut(i32) -> bool,
    {
        let mut state = self.state();
        loop {
            if state.end_signal {
                return None;
            }
            if predicate(state.current_time) {
                return Some(state.current_time);
            }
            state = self.tick.wait(state).expect("clock state lock poisoned");
        }
    }

    /// Returns true only for the call that actually raised the signal.
    pub fn raise_end_signal(&self) -> bool {
        let mut state = self.state();
        if state.end_signal {
            return false;
        }
        state.end_signal = true;
        drop(state);
        self.tick.notify_all();
        true
    }

    pub fn run_ticker(&self, tick_interval: Duration) {
        info!("SystemTime: time starts ticking");
        loop {
            thread::sleep(tick_interval);
            if !self.advance() {
                break;
            }
        }
        info!("SystemTime: stopped at {}ms", self.current_time());
    }
}
