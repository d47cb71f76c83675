//! Append-only record of every executed interval
use serde_derive::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub core_id: usize,
    pub pid: usize,
    pub start_time: i32,
    pub end_time: i32,
}

impl ChartEntry {
    pub fn run_length(&self) -> i32 {
        self.end_time - self.start_time
    }
}

/// Shared by all cores. Entries keep append order, which is not time order
/// across cores.
#[derive(Debug, Default)]
pub struct ChartRecorder {
    entries: Mutex<Vec<ChartEntry>>,
}

impl ChartRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_in_chart(&self, core_id: usize, pid: usize, start_time: i32, end_time: i32) {
        self.entries
            .lock()
            .expect("chart lock poisoned")
            .push(ChartEntry {
                core_id,
                pid,
                start_time,
                end_time,
            });
    }

    pub fn entries(&self) -> Vec<ChartEntry> {
        self.entries.lock().expect("chart lock poisoned").clone()
    }

    /// Intervals of one process ordered by start time.
    pub fn entries_of(&self, pid: usize) -> Vec<ChartEntry> {
        let mut entries: Vec<ChartEntry> = self
            .entries()
            .into_iter()
            .filter(|entry| entry.pid == pid)
            .collect();
        entries.sort_by_key(|entry| entry.start_time);
        entries
    }
}
