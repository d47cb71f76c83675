use crate::core::{Core, SchedulingPolicy};
use crate::processor::ProcessorBase;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HomogeneousProcessor {
    cores: Vec<Arc<Core>>,
}

impl HomogeneousProcessor {
    pub fn new(schedulers: &[SchedulingPolicy]) -> Self {
        let cores = schedulers
            .iter()
            .enumerate()
            .map(|(core_id, &scheduler)| Arc::new(Core::new(core_id, scheduler)))
            .collect::<Vec<Arc<Core>>>();
        Self { cores }
    }

    pub fn cores(&self) -> &[Arc<Core>] {
        &self.cores
    }
}

impl ProcessorBase for HomogeneousProcessor {
    fn get_number_of_cores(&self) -> usize {
        self.cores.len()
    }

    fn get_core(&self, core_id: usize) -> Option<&Arc<Core>> {
        self.cores.get(core_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Process;

    fn create_processor(num_cores: usize) -> HomogeneousProcessor {
        HomogeneousProcessor::new(&vec![SchedulingPolicy::RoundRobin; num_cores])
    }

    #[test]
    fn test_homogeneous_processor_new() {
        let processor = create_processor(2);
        assert_eq!(processor.get_number_of_cores(), 2);
        assert_eq!(processor.cores()[0].core_id(), 0);
        assert_eq!(processor.cores()[1].core_id(), 1);
        assert_eq!(processor.cores()[0].load(), 0);
        assert!(processor.get_core(2).is_none());
    }

    #[test]
    fn test_least_loaded_ties_go_to_lowest_id() {
        let processor = create_processor(4);
        assert_eq!(processor.get_least_loaded_core_index(), Some(0));

        processor.cores()[0].reserve_load();
        processor.cores()[2].reserve_load();
        assert_eq!(processor.get_least_loaded_core_index(), Some(1));

        processor.cores()[1].reserve_load();
        processor.cores()[1].reserve_load();
        assert_eq!(processor.get_least_loaded_core_index(), Some(3));

        processor.cores()[3].reserve_load();
        assert_eq!(processor.get_least_loaded_core_index(), Some(0));
    }

    #[test]
    fn test_least_loaded_is_minimum() {
        let processor = create_processor(3);
        for (core_id, load) in [(0, 3), (1, 1), (2, 2)] {
            for _ in 0..load {
                processor.cores()[core_id].reserve_load();
            }
        }
        let chosen = processor.get_least_loaded_core_index().unwrap();
        let chosen_load = processor.cores()[chosen].load();
        assert_eq!(chosen, 1);
        assert!(processor.cores().iter().all(|core| chosen_load <= core.load()));
    }

    #[test]
    fn test_least_loaded_no_cores() {
        let processor = create_processor(0);
        assert_eq!(processor.get_least_loaded_core_index(), None);
    }

    #[test]
    fn test_homogeneous_processor_allocate() {
        let processor = create_processor(2);
        let process = Process::new(1, 0, 5);
        assert!(processor.allocate(1, &process));
        assert_eq!(process.assigned_core(), Some(1));
        assert_eq!(processor.cores()[1].load(), 1);
    }

    #[test]
    fn test_homogeneous_processor_allocate_no_exist_core() {
        let processor = create_processor(2);
        let process = Process::new(1, 0, 5);
        assert!(!processor.allocate(2, &process));
        assert_eq!(process.assigned_core(), None);
    }
}
