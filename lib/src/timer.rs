//! Single timer service for blocked processes
use crate::{error::SimulationError, process::Process};
use log::info;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct TimerRegistry {
    next_seq: u64,
    // Keyed by (wake_time, registration order) so equal wake times stay FIFO.
    pending: BTreeMap<(i32, u64), Arc<Process>>,
}

/// Holds `(wake_time, process)` pairs. The dispatcher fires it on every
/// clock wakeup instead of keeping one waiter per block event.
#[derive(Debug, Default)]
pub struct UnblockTimer {
    registry: Mutex<TimerRegistry>,
}

impl UnblockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, wake_time: i32, process: Arc<Process>) {
        let mut registry = self.registry.lock().expect("timer lock poisoned");
        let seq = registry.next_seq;
        registry.next_seq += 1;
        registry.pending.insert((wake_time, seq), process);
    }

    pub fn next_wake_time(&self) -> Option<i32> {
        self.registry
            .lock()
            .expect("timer lock poisoned")
            .pending
            .keys()
            .next()
            .map(|&(wake_time, _)| wake_time)
    }

    pub fn has_due(&self, current_time: i32) -> bool {
        self.next_wake_time()
            .is_some_and(|wake_time| wake_time <= current_time)
    }

    /// Unblocks every process whose wake time has been reached and returns
    /// them with their wake times in wake order.
    pub fn fire_due(
        &self,
        current_time: i32,
    ) -> Result<Vec<(i32, Arc<Process>)>, SimulationError> {
        let due = {
            let mut registry = self.registry.lock().expect("timer lock poisoned");
            let later = registry.pending.split_off(&(current_time + 1, 0));
            std::mem::replace(&mut registry.pending, later)
        };
        let mut unblocked = Vec::with_capacity(due.len());
        for ((wake_time, _), process) in due {
            process.unblock()?;
            info!("Process {} has been unblocked", process.pid());
            unblocked.push((wake_time, process));
        }
        Ok(unblocked)
    }

    pub fn len(&self) -> usize {
        self.registry.lock().expect("timer lock poisoned").pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessStatus;

    fn blocked_process(pid: usize, next_active_time: i32) -> Arc<Process> {
        let process = Arc::new(Process::new(pid, 0, 10));
        process.set_ready().unwrap();
        process.run().unwrap();
        process.block(next_active_time, 2).unwrap();
        process
    }

    #[test]
    fn test_timer_fire_due_in_wake_order() {
        let timer = UnblockTimer::new();
        timer.register(9, blocked_process(1, 9));
        timer.register(7, blocked_process(2, 7));
        timer.register(7, blocked_process(3, 7));
        assert_eq!(timer.next_wake_time(), Some(7));
        assert!(!timer.has_due(6));

        let fired = timer.fire_due(8).unwrap();
        assert_eq!(
            fired.iter().map(|(t, p)| (*t, p.pid())).collect::<Vec<_>>(),
            vec![(7, 2), (7, 3)]
        );
        assert!(fired
            .iter()
            .all(|(_, p)| p.status() == ProcessStatus::Unblocked));
        assert_eq!(timer.len(), 1);
        assert_eq!(timer.next_wake_time(), Some(9));
    }

    #[test]
    fn test_timer_fire_due_nothing_pending() {
        let timer = UnblockTimer::new();
        assert!(timer.fire_due(100).unwrap().is_empty());
        assert!(timer.is_empty());
        assert_eq!(timer.next_wake_time(), None);
    }

    #[test]
    fn test_timer_fire_due_rejects_not_blocked() {
        let timer = UnblockTimer::new();
        timer.register(1, Arc::new(Process::new(1, 0, 3)));
        assert!(timer.fire_due(1).is_err());
    }
}
