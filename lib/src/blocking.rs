//! Random mid-run blocking events
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Decides at each quantum boundary whether the running process blocks and for how long.
#[derive(Debug, Clone)]
pub struct BlockingModel {
    enabled: bool,
    rng: StdRng,
}

impl BlockingModel {
    pub fn new(enabled: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { enabled, rng }
    }

    pub fn disabled() -> Self {
        Self::new(false, Some(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Draws a number in `[1, burst_time]` and blocks if it hits the remaining
    /// burst time. Returns the block duration, drawn from `[1, remaining]`.
    pub fn random_block(&mut self, burst_time: i32, burst_time_remaining: i32) -> Option<i32> {
        if !self.enabled || burst_time < 1 || burst_time_remaining < 1 {
            return None;
        }
        let block_choice = self.rng.gen_range(1..=burst_time);
        if block_choice != burst_time_remaining {
            return None;
        }
        Some(self.rng.gen_range(1..=burst_time_remaining))
    }
}
