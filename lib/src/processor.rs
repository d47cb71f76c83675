use crate::{core::Core, process::Process};
use log::warn;
use std::sync::Arc;

pub trait ProcessorBase {
    fn get_number_of_cores(&self) -> usize;
    fn get_core(&self, core_id: usize) -> Option<&Arc<Core>>;

    /// Index of the core with the smallest current load, lowest index on ties.
    fn get_least_loaded_core_index(&self) -> Option<usize> {
        let mut least_loaded: Option<(usize, usize)> = None;
        for core_id in 0..self.get_number_of_cores() {
            let load = self.get_core(core_id)?.load();
            match least_loaded {
                Some((_, min_load)) if load >= min_load => {}
                _ => least_loaded = Some((core_id, load)),
            }
        }
        least_loaded.map(|(core_id, _)| core_id)
    }

    ///return bool since "panic!" would terminate
    fn allocate(&self, core_id: usize, process: &Process) -> bool {
        match self.get_core(core_id) {
            Some(core) => {
                process.assign_core(core_id);
                core.reserve_load();
                true
            }
            None => {
                warn!("Core {} does not exist", core_id);
                false
            }
        }
    }
}
