//! Processes handed off by the dispatcher and not yet pulled by their core
use crate::process::Process;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct RequestQueue {
    requests: Mutex<Vec<Arc<Process>>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, process: Arc<Process>) {
        self.requests
            .lock()
            .expect("request queue lock poisoned")
            .push(process);
    }

    /// Removes every request assigned to `core_id` whose process is waiting
    /// for an assignment. The scan and the removal form one critical section.
    pub fn take_assigned(&self, core_id: usize) -> Vec<Arc<Process>> {
        let mut requests = self.requests.lock().expect("request queue lock poisoned");
        let mut taken = Vec::new();
        let mut i = 0;
        while i < requests.len() {
            let process = &requests[i];
            if process.assigned_core() == Some(core_id) && process.status().is_pullable() {
                taken.push(requests.remove(i));
            } else {
                i += 1;
            }
        }
        taken
    }

    pub fn len(&self) -> usize {
        self.requests
            .lock()
            .expect("request queue lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned_process(pid: usize, core_id: usize) -> Arc<Process> {
        let process = Arc::new(Process::new(pid, 0, 5));
        process.assign_core(core_id);
        process
    }

    #[test]
    fn test_take_assigned_only_own_core() {
        let queue = RequestQueue::new();
        queue.push(assigned_process(1, 0));
        queue.push(assigned_process(2, 1));
        queue.push(assigned_process(3, 0));

        let taken = queue.take_assigned(0);
        assert_eq!(taken.iter().map(|p| p.pid()).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(queue.len(), 1);
        assert!(queue.take_assigned(0).is_empty());
        assert_eq!(queue.take_assigned(1)[0].pid(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_take_assigned_skips_unassigned_and_not_pullable() {
        let queue = RequestQueue::new();
        queue.push(Arc::new(Process::new(1, 0, 5)));
        let ready = assigned_process(2, 0);
        ready.set_ready().unwrap();
        queue.push(ready);

        assert!(queue.take_assigned(0).is_empty());
        assert_eq!(queue.len(), 2);
    }
}
