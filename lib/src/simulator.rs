//! Builds a simulation run, starts every unit and collects the finished report
use crate::{
    blocking::BlockingModel,
    config::SimulationConfig,
    context::SimulationContext,
    dispatcher::Dispatcher,
    error::SimulationError,
    homogeneous::HomogeneousProcessor,
    monitor::TerminationMonitor,
    process::Process,
    process_creator::create_processes,
    report::{CoreRecord, ProcessRecord, SimulationReport},
};
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type UnitHandle = (String, JoinHandle<Result<(), SimulationError>>);

/// Raises the end signal if a unit unwinds, so the rest of the run can stop.
struct EndOnPanic(Arc<SimulationContext>);

impl Drop for EndOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.clock.raise_end_signal();
        }
    }
}

/// A caller-provided pool must be non-empty, hold unique pids and only
/// processes nobody has touched yet.
fn validate_processes(processes: &[Arc<Process>]) -> Result<(), SimulationError> {
    if processes.is_empty() {
        return Err(SimulationError::NoProcesses);
    }
    let mut pids = HashSet::with_capacity(processes.len());
    for process in processes {
        let pid = process.pid();
        if !pids.insert(pid) {
            return Err(SimulationError::InvalidProcess {
                pid,
                reason: "duplicate pid",
            });
        }
        if process.arrival_time() < 0 {
            return Err(SimulationError::InvalidProcess {
                pid,
                reason: "negative arrival time",
            });
        }
        if process.burst_time() < 1 {
            return Err(SimulationError::InvalidProcess {
                pid,
                reason: "burst time must be positive",
            });
        }
        if !process.is_fresh() {
            return Err(SimulationError::InvalidProcess {
                pid,
                reason: "process has already been scheduled",
            });
        }
    }
    Ok(())
}

/// Waits for every unit and returns the first failure, panics included.
fn join_units(units: Vec<UnitHandle>) -> Option<SimulationError> {
    let mut first_error = None;
    for (name, handle) in units {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                first_error.get_or_insert(err);
            }
            Err(_) => {
                error!("'{}' panicked", name);
                first_error.get_or_insert(SimulationError::UnitPanicked(name));
            }
        }
    }
    first_error
}

#[derive(Debug, Clone, PartialEq)]
enum RunState {
    Idle,
    Running,
    Finished,
    Failed(String),
}

pub struct Simulator {
    config: SimulationConfig,
    processes: Vec<Arc<Process>>,
    processor: Arc<HomogeneousProcessor>,
    ctx: Arc<SimulationContext>,
    run_state: Mutex<RunState>,
}

impl Simulator {
    /// Validates the config and generates the process pool. Nothing runs yet.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let processes = create_processes(&config);
        Ok(Self::build(config, processes))
    }

    /// Same as [`Simulator::new`] with a caller-provided process pool.
    pub fn with_processes(
        config: SimulationConfig,
        processes: Vec<Arc<Process>>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        validate_processes(&processes)?;
        Ok(Self::build(config, processes))
    }

    fn build(config: SimulationConfig, processes: Vec<Arc<Process>>) -> Self {
        let processor = Arc::new(HomogeneousProcessor::new(&config.schedulers));
        let ctx = Arc::new(SimulationContext::new(config.time_quantum));
        Self {
            config,
            processes,
            processor,
            ctx,
            run_state: Mutex::new(RunState::Idle),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn processes(&self) -> &[Arc<Process>] {
        &self.processes
    }

    pub fn current_time(&self) -> i32 {
        self.ctx.clock.current_time()
    }

    fn spawn_unit<F>(&self, name: String, unit: F) -> Result<UnitHandle, SimulationError>
    where
        F: FnOnce(&SimulationContext) -> Result<(), SimulationError> + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let unit_name = name.clone();
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            let _guard = EndOnPanic(Arc::clone(&ctx));
            let result = unit(&ctx);
            if let Err(err) = &result {
                error!("'{}' failed: {}", unit_name, err);
                ctx.clock.raise_end_signal();
            }
            result
        })?;
        Ok((name, handle))
    }

    fn spawn_units(&self, units: &mut Vec<UnitHandle>) -> Result<(), SimulationError> {
        let tick_interval = self.config.tick_interval();
        units.push(self.spawn_unit("clock".to_string(), move |ctx| {
            ctx.clock.run_ticker(tick_interval);
            Ok(())
        })?);

        let mut dispatcher = Dispatcher::new(&self.processes, Arc::clone(&self.processor));
        units.push(self.spawn_unit("dispatcher".to_string(), move |ctx| {
            dispatcher.request(ctx)
        })?);

        for core in self.processor.cores() {
            let core_id = core.core_id();
            let mut blocking = BlockingModel::new(
                self.config.blocking,
                self.config
                    .seed
                    .map(|seed| seed.wrapping_add(core_id as u64 + 1)),
            );
            let scheduler = Arc::clone(core);
            units.push(self.spawn_unit(format!("core-{}-scheduler", core_id), move |ctx| {
                scheduler.run(ctx, &mut blocking)
            })?);
            let puller = Arc::clone(core);
            units.push(self.spawn_unit(format!("core-{}-puller", core_id), move |ctx| {
                puller.pull(ctx)
            })?);
        }
        Ok(())
    }

    /// Runs the simulation to completion on the calling thread's watch and
    /// returns the finalized report. A simulator runs once: later calls return
    /// the same report, or the reason the first run failed.
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        {
            let mut run_state = self.run_state.lock().expect("run state lock poisoned");
            match &*run_state {
                RunState::Idle => *run_state = RunState::Running,
                RunState::Running => return Err(SimulationError::AlreadyRunning),
                RunState::Finished => {
                    warn!("Simulation has already finished");
                    return Ok(self.report());
                }
                RunState::Failed(reason) => {
                    return Err(SimulationError::PreviousRunFailed(reason.clone()))
                }
            }
        }

        let outcome = self.execute();
        *self.run_state.lock().expect("run state lock poisoned") = match &outcome {
            Ok(_) => RunState::Finished,
            Err(err) => RunState::Failed(err.to_string()),
        };
        outcome
    }

    fn execute(&self) -> Result<SimulationReport, SimulationError> {
        info!("< Start Scheduling Simulation! >");

        let mut units = Vec::with_capacity(2 * self.processor.cores().len() + 2);
        let spawned = self.spawn_units(&mut units);
        if spawned.is_ok() {
            TerminationMonitor::new(&self.processes).end_check(&self.ctx.clock);
        } else {
            self.ctx.clock.raise_end_signal();
        }

        let joined = join_units(units);
        if let Some(err) = spawned.err().or(joined) {
            return Err(err);
        }
        info!(
            "< Scheduling Simulation finished at {}ms >",
            self.current_time()
        );
        Ok(self.report())
    }

    pub fn report(&self) -> SimulationReport {
        let mut processes: Vec<ProcessRecord> = self
            .processes
            .iter()
            .map(|process| ProcessRecord::from_process(process))
            .collect();
        processes.sort_by_key(|record| record.pid);
        SimulationReport {
            processes,
            cores: self
                .processor
                .cores()
                .iter()
                .map(|core| CoreRecord::from_core(core))
                .collect(),
            scheduling_chart: self.ctx.chart.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chart::ChartEntry, core::SchedulingPolicy, process::ProcessStatus,
        process_creator::create_processes_from_params,
    };

    fn create_config(number_of_cores: usize, tick_interval_ms: u64) -> SimulationConfig {
        let mut config = SimulationConfig::new(1, [1, 15], number_of_cores);
        config.blocking = false;
        config.tick_interval_ms = tick_interval_ms;
        config
    }

    fn run_with_params(
        config: SimulationConfig,
        params: &[(i32, i32)],
    ) -> (Simulator, SimulationReport) {
        let simulator =
            Simulator::with_processes(config, create_processes_from_params(params)).unwrap();
        let report = simulator.run().unwrap();
        (simulator, report)
    }

    fn intervals(report: &SimulationReport) -> Vec<(usize, i32, i32)> {
        let mut chart: Vec<(usize, i32, i32)> = report
            .scheduling_chart
            .iter()
            .map(|e| (e.pid, e.start_time, e.end_time))
            .collect();
        chart.sort_by_key(|&(pid, start, _)| (start, pid));
        chart
    }

    fn assert_run_invariants(simulator: &Simulator, report: &SimulationReport) {
        for process in simulator.processes() {
            let state = process.snapshot();
            assert_eq!(state.status, ProcessStatus::Completed);
            assert_eq!(state.burst_time_remaining, 0);
        }
        for record in &report.processes {
            assert_eq!(
                record.turnaround_time,
                record.waiting_time + record.burst_time
            );
            assert!(record.waiting_time >= 0);
            assert!(record.completion_time >= record.arrival_time + record.burst_time);

            let entries = report.chart_of(record.pid);
            let run_length: i32 = entries.iter().map(ChartEntry::run_length).sum();
            assert_eq!(run_length, record.burst_time);
            assert!(entries[0].start_time >= record.arrival_time);
            assert_eq!(entries.last().unwrap().end_time, record.completion_time);
            assert!(entries
                .windows(2)
                .all(|pair| pair[0].end_time <= pair[1].start_time));
        }
        for core in &report.cores {
            let mut entries: Vec<&ChartEntry> = report
                .scheduling_chart
                .iter()
                .filter(|e| e.core_id == core.core_id)
                .collect();
            entries.sort_by_key(|e| e.start_time);
            assert!(entries
                .windows(2)
                .all(|pair| pair[0].end_time <= pair[1].start_time));
        }
        let total_processed: usize = report.cores.iter().map(|c| c.total_processed).sum();
        assert_eq!(total_processed, report.processes.len());
    }

    #[test]
    fn test_single_short_process() {
        let (simulator, report) = run_with_params(create_config(1, 5), &[(1, 3)]);
        assert_run_invariants(&simulator, &report);
        assert_eq!(
            report.scheduling_chart,
            vec![ChartEntry {
                core_id: 0,
                pid: 1,
                start_time: 1,
                end_time: 4
            }]
        );
        let record = report.process(1).unwrap();
        assert_eq!(record.completion_time, 4);
        assert_eq!(record.waiting_time, 0);
        assert_eq!(record.turnaround_time, 3);
        assert_eq!(report.cores[0].total_processed, 1);
    }

    #[test]
    fn test_two_processes_round_robin_interleave() {
        let (simulator, report) = run_with_params(create_config(1, 10), &[(1, 10), (2, 10)]);
        assert_run_invariants(&simulator, &report);
        assert_eq!(
            intervals(&report),
            vec![(1, 1, 6), (2, 6, 11), (1, 11, 16), (2, 16, 21)]
        );
        assert_eq!(report.process(1).unwrap().completion_time, 16);
        assert_eq!(report.process(2).unwrap().completion_time, 21);
        assert_eq!(report.process(1).unwrap().waiting_time, 5);
        assert_eq!(report.process(2).unwrap().waiting_time, 9);
    }

    #[test]
    fn test_equal_arrivals_spread_over_cores() {
        let (simulator, report) = run_with_params(create_config(2, 5), &[(0, 6), (0, 6)]);
        assert_run_invariants(&simulator, &report);
        assert!(report.chart_of(1).iter().all(|e| e.core_id == 0));
        assert!(report.chart_of(2).iter().all(|e| e.core_id == 1));
        assert_eq!(report.cores[0].total_processed, 1);
        assert_eq!(report.cores[1].total_processed, 1);
        assert_eq!(report.process(1).unwrap().completion_time, 6);
        assert_eq!(report.process(2).unwrap().completion_time, 6);
    }

    #[test]
    fn test_invalid_scheduler_count() {
        let mut config = create_config(2, 5);
        config.schedulers = vec![SchedulingPolicy::RoundRobin];
        let result = Simulator::new(config);
        assert!(matches!(
            result,
            Err(SimulationError::SchedulerCountMismatch {
                schedulers: 1,
                cores: 2
            })
        ));
    }

    #[test]
    fn test_empty_process_pool() {
        assert!(matches!(
            Simulator::with_processes(create_config(1, 5), Vec::new()),
            Err(SimulationError::NoProcesses)
        ));
    }

    #[test]
    fn test_random_run_with_blocking() {
        let mut config = SimulationConfig::new(8, [1, 15], 2);
        config.tick_interval_ms = 2;
        config.seed = Some(7);
        config.random_arrival = true;
        let simulator = Simulator::new(config).unwrap();
        let report = simulator.run().unwrap();
        assert_eq!(report.processes.len(), 8);
        assert_run_invariants(&simulator, &report);
    }

    #[test]
    fn test_lone_process_gaps_are_block_durations() {
        let mut config = create_config(1, 2);
        config.blocking = true;
        config.seed = Some(3);
        config.time_quantum = 2;
        let (simulator, report) = run_with_params(config, &[(0, 15)]);
        assert_run_invariants(&simulator, &report);

        let record = report.process(1).unwrap();
        let entries = report.chart_of(1);
        let gaps: i32 = entries
            .windows(2)
            .map(|pair| pair[1].start_time - pair[0].end_time)
            .sum();
        // Nothing else competes for the core, so every gap is a block.
        assert_eq!(
            gaps,
            record.completion_time - record.arrival_time - record.burst_time
        );
        assert_eq!(entries[0].start_time, 0);
    }

    #[test]
    fn test_with_processes_rejects_shared_process() {
        let process = Arc::new(Process::new(1, 0, 4));
        let result = Simulator::with_processes(
            create_config(1, 5),
            vec![Arc::clone(&process), Arc::clone(&process)],
        );
        assert!(matches!(
            result,
            Err(SimulationError::InvalidProcess {
                pid: 1,
                reason: "duplicate pid"
            })
        ));
    }

    #[test]
    fn test_with_processes_rejects_scheduled_process() {
        let processes = create_processes_from_params(&[(0, 4), (1, 4)]);
        processes[1].set_ready().unwrap();
        assert!(matches!(
            Simulator::with_processes(create_config(1, 5), processes),
            Err(SimulationError::InvalidProcess { pid: 2, .. })
        ));
        let zero_burst = create_processes_from_params(&[(0, 0)]);
        assert!(matches!(
            Simulator::with_processes(create_config(1, 5), zero_burst),
            Err(SimulationError::InvalidProcess { pid: 1, .. })
        ));
    }

    #[test]
    fn test_failing_unit_ends_run() {
        let simulator = Simulator::with_processes(
            create_config(2, 5),
            create_processes_from_params(&[(0, 5)]),
        )
        .unwrap();
        // The dispatcher fires this entry at time 0 and cannot unblock a CREATED process.
        let process = Arc::clone(&simulator.processes()[0]);
        simulator.ctx.timer.register(0, process);

        let result = simulator.run();
        assert!(matches!(
            result,
            Err(SimulationError::InvalidTransition {
                pid: 1,
                from: ProcessStatus::Created,
                to: ProcessStatus::Unblocked
            })
        ));
        assert!(simulator.ctx.clock.is_ended());
        // Every unit has been joined and dropped its handle on the context.
        assert_eq!(Arc::strong_count(&simulator.ctx), 1);

        match simulator.run() {
            Err(SimulationError::PreviousRunFailed(reason)) => {
                assert!(reason.contains("CREATED to UNBLOCKED"))
            }
            other => panic!("unexpected second run result: {:?}", other),
        }
    }

    #[test]
    fn test_unit_error_raises_end_signal() {
        let simulator = Simulator::with_processes(
            create_config(1, 5),
            create_processes_from_params(&[(0, 1)]),
        )
        .unwrap();
        let units = vec![simulator
            .spawn_unit("failing".to_string(), |_| {
                Err(SimulationError::NoCoreAvailable(1))
            })
            .unwrap()];
        assert!(matches!(
            join_units(units),
            Some(SimulationError::NoCoreAvailable(1))
        ));
        assert!(simulator.ctx.clock.is_ended());
    }

    #[test]
    fn test_panicking_unit_is_reported() {
        let simulator = Simulator::with_processes(
            create_config(1, 5),
            create_processes_from_params(&[(0, 1)]),
        )
        .unwrap();
        let units = vec![
            simulator
                .spawn_unit("steady".to_string(), |ctx| {
                    ctx.clock.wait_until(|_| false);
                    Ok(())
                })
                .unwrap(),
            simulator
                .spawn_unit("faulty".to_string(), |_| panic!("unit failure"))
                .unwrap(),
        ];
        // The steady unit only returns because the panic raised the end signal.
        match join_units(units) {
            Some(SimulationError::UnitPanicked(name)) => assert_eq!(name, "faulty"),
            other => panic!("unexpected join result: {:?}", other),
        }
        assert!(simulator.ctx.clock.is_ended());
    }

    #[test]
    fn test_run_twice_returns_same_report() {
        let (simulator, report) = run_with_params(create_config(1, 5), &[(0, 2)]);
        assert_eq!(simulator.run().unwrap(), report);
    }
}
