//! Read-only snapshot of a finished run and its textual summary
use crate::{chart::ChartEntry, core::Core, process::Process};
use serde_derive::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: usize,
    pub arrival_time: i32,
    pub burst_time: i32,
    pub completion_time: i32,
    pub waiting_time: i32,
    pub turnaround_time: i32,
}

impl ProcessRecord {
    pub fn from_process(process: &Process) -> Self {
        let state = process.snapshot();
        Self {
            pid: process.pid(),
            arrival_time: process.arrival_time(),
            burst_time: process.burst_time(),
            completion_time: state.completion_time,
            waiting_time: state.waiting_time,
            turnaround_time: state.turnaround_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRecord {
    pub core_id: usize,
    pub total_processed: usize,
}

impl CoreRecord {
    pub fn from_core(core: &Core) -> Self {
        Self {
            core_id: core.core_id(),
            total_processed: core.total_load(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub processes: Vec<ProcessRecord>,
    pub cores: Vec<CoreRecord>,
    pub scheduling_chart: Vec<ChartEntry>,
}

impl SimulationReport {
    pub fn process(&self, pid: usize) -> Option<&ProcessRecord> {
        self.processes.iter().find(|record| record.pid == pid)
    }

    /// Intervals of one process ordered by start time.
    pub fn chart_of(&self, pid: usize) -> Vec<ChartEntry> {
        let mut entries: Vec<ChartEntry> = self
            .scheduling_chart
            .iter()
            .filter(|entry| entry.pid == pid)
            .copied()
            .collect();
        entries.sort_by_key(|entry| entry.start_time);
        entries
    }

    pub fn schedule_length(&self) -> i32 {
        self.scheduling_chart
            .iter()
            .map(|entry| entry.end_time)
            .max()
            .unwrap_or(0)
    }

    pub fn average_waiting_time(&self) -> f32 {
        if self.processes.is_empty() {
            return 0.0;
        }
        self.processes
            .iter()
            .map(|record| record.waiting_time as f32)
            .sum::<f32>()
            / self.processes.len() as f32
    }

    pub fn average_turnaround_time(&self) -> f32 {
        if self.processes.is_empty() {
            return 0.0;
        }
        self.processes
            .iter()
            .map(|record| record.turnaround_time as f32)
            .sum::<f32>()
            / self.processes.len() as f32
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for core in &self.cores {
            let _ = writeln!(
                summary,
                "Core {} Total Load: {}",
                core.core_id, core.total_processed
            );
        }
        for record in &self.processes {
            let _ = writeln!(
                summary,
                "Process {}: Arrival Time: {}ms, Burst Time: {}, Completion Time: {}, Waiting Time: {}ms, Turnaround Time: {}ms",
                record.pid,
                record.arrival_time,
                record.burst_time,
                record.completion_time,
                record.waiting_time,
                record.turnaround_time
            );
        }
        let _ = writeln!(
            summary,
            "Average Waiting Time: {:.2}ms",
            self.average_waiting_time()
        );
        let _ = writeln!(
            summary,
            "Average Turnaround Time: {:.2}ms",
            self.average_turnaround_time()
        );
        summary
    }

    /// One row per process, one column per tick. Executed ticks show the core id
    /// in hex, idle ticks show '.'.
    pub fn render_chart(&self) -> String {
        let schedule_length = self.schedule_length().max(0) as usize;
        let mut chart = String::new();
        let _ = writeln!(
            chart,
            "Scheduling Simulation Chart (0..{}ms, cells are core ids)",
            schedule_length
        );
        for record in &self.processes {
            let mut row = vec!['.'; schedule_length];
            for entry in self.chart_of(record.pid) {
                let mark = std::char::from_digit(entry.core_id as u32, 16).unwrap_or('#');
                for cell in row
                    .iter_mut()
                    .take(entry.end_time.max(0) as usize)
                    .skip(entry.start_time.max(0) as usize)
                {
                    *cell = mark;
                }
            }
            let _ = writeln!(
                chart,
                "Process {:>3} |{}|",
                record.pid,
                row.into_iter().collect::<String>()
            );
        }
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_report() -> SimulationReport {
        SimulationReport {
            processes: vec![
                ProcessRecord {
                    pid: 1,
                    arrival_time: 1,
                    burst_time: 10,
                    completion_time: 16,
                    waiting_time: 5,
                    turnaround_time: 15,
                },
                ProcessRecord {
                    pid: 2,
                    arrival_time: 2,
                    burst_time: 3,
                    completion_time: 9,
                    waiting_time: 4,
                    turnaround_time: 7,
                },
            ],
            cores: vec![
                CoreRecord {
                    core_id: 0,
                    total_processed: 1,
                },
                CoreRecord {
                    core_id: 1,
                    total_processed: 1,
                },
            ],
            scheduling_chart: vec![
                ChartEntry {
                    core_id: 0,
                    pid: 1,
                    start_time: 11,
                    end_time: 16,
                },
                ChartEntry {
                    core_id: 0,
                    pid: 1,
                    start_time: 1,
                    end_time: 6,
                },
                ChartEntry {
                    core_id: 1,
                    pid: 2,
                    start_time: 6,
                    end_time: 9,
                },
            ],
        }
    }

    #[test]
    fn test_report_averages() {
        let report = create_report();
        assert_eq!(report.average_waiting_time(), 4.5);
        assert_eq!(report.average_turnaround_time(), 11.0);
        assert_eq!(SimulationReport::default().average_waiting_time(), 0.0);
    }

    #[test]
    fn test_report_chart_of_sorted() {
        let report = create_report();
        let starts: Vec<i32> = report.chart_of(1).iter().map(|e| e.start_time).collect();
        assert_eq!(starts, vec![1, 11]);
        assert_eq!(report.schedule_length(), 16);
        assert_eq!(report.process(2).unwrap().burst_time, 3);
        assert!(report.process(3).is_none());
    }

    #[test]
    fn test_report_summary() {
        let summary = create_report().summary();
        assert!(summary.contains("Core 1 Total Load: 1"));
        assert!(summary.contains("Process 2: Arrival Time: 2ms, Burst Time: 3, Completion Time: 9, Waiting Time: 4ms, Turnaround Time: 7ms"));
        assert!(summary.contains("Average Waiting Time: 4.50ms"));
        assert!(summary.contains("Average Turnaround Time: 11.00ms"));
    }

    #[test]
    fn test_report_render_chart() {
        let chart = create_report().render_chart();
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Process   1 |.00000.....00000|");
        assert_eq!(lines[2], "Process   2 |......111.......|");
    }
}
