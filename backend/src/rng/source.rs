//! Random sources consumed by the SSA step
//!
//! [`SeedPolicy::Shared`] draws every number from one mutex-protected
//! generator shared by all workers. The default gives each trajectory its own
//! stream so workers never contend and a trajectory is reproducible from
//! `(root_seed, cell_index)` alone.

use super::xorshift::RngManager;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Anything that can hand out uniform draws on (0, 1]
pub trait RandomSource {
    /// Uniform draw on (0, 1]; never returns exactly zero
    fn uniform_open_unit(&mut self) -> f64;
}

impl RandomSource for RngManager {
    fn uniform_open_unit(&mut self) -> f64 {
        self.next_open_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_open_unit(&mut self) -> f64 {
        (**self).uniform_open_unit()
    }
}

/// Handle to a single generator shared across threads
///
/// Each draw takes the lock, so the sequence a given trajectory sees
/// depends on thread scheduling. Only the multiset of draws is fixed by
/// the seed.
#[derive(Debug, Clone)]
pub struct SharedRng {
    inner: Arc<Mutex<RngManager>>,
}

impl SharedRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RngManager::new(seed))),
        }
    }

    /// Current state of the underlying generator
    pub fn get_state(&self) -> u64 {
        self.inner.lock().get_state()
    }
}

impl RandomSource for SharedRng {
    fn uniform_open_unit(&mut self) -> f64 {
        self.inner.lock().next_open_unit()
    }
}

/// How trajectory random streams are seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SeedPolicy {
    /// One independent stream per trajectory, derived from the root seed
    /// and the cell index
    PerTrajectory { root_seed: u64 },

    /// One generator behind a lock for every draw of every worker
    Shared { seed: u64 },
}

impl SeedPolicy {
    /// Seed for the orchestrator's own stream (initial-state sampling)
    pub fn root_seed(&self) -> u64 {
        match *self {
            SeedPolicy::PerTrajectory { root_seed } => root_seed,
            SeedPolicy::Shared { seed } => seed,
        }
    }

    /// Whether each trajectory can be replayed in isolation
    pub fn is_reproducible(&self) -> bool {
        matches!(self, SeedPolicy::PerTrajectory { .. })
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::PerTrajectory { root_seed: 1 }
    }
}
