use crate::{
    chart::ChartRecorder, clock::Clock, request_queue::RequestQueue, timer::UnblockTimer,
};

/// Shared state owned by one simulation run and handed to every unit.
#[derive(Debug)]
pub struct SimulationContext {
    pub clock: Clock,
    pub request_queue: RequestQueue,
    pub chart: ChartRecorder,
    pub timer: UnblockTimer,
    pub time_quantum: i32,
}

impl SimulationContext {
    pub fn new(time_quantum: i32) -> Self {
        Self {
            clock: Clock::new(),
            request_queue: RequestQueue::new(),
            chart: ChartRecorder::new(),
            timer: UnblockTimer::new(),
            time_quantum,
        }
    }
}
