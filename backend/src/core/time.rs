//! Checkpoint timing
//!
//! SSA events happen at irregular times; output is sampled on a fixed
//! grid. The clock keeps a moving threshold and reports a crossing the
//! first time observed simulated time reaches it.
//!
//! A crossing advances the threshold by exactly one resolution, even when
//! one reaction jump skipped past several grid points. Long jumps are
//! therefore under-sampled: the skipped points are caught up one per
//! subsequent step, each recorded at the (later) observed time.

use serde::{Deserialize, Serialize};

/// Moving checkpoint threshold
///
/// # Example
/// ```
/// use hes1_ssa_core::CheckpointClock;
///
/// let mut clock = CheckpointClock::new(60.0);
/// assert!(!clock.observe(59.9));
/// assert!(clock.observe(61.0));
/// assert_eq!(clock.next_checkpoint(), 120.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointClock {
    /// Next time at which a checkpoint is due
    next_checkpoint: f64,
    /// Grid spacing
    resolution: f64,
    /// Checkpoints reported so far (excluding the initial one)
    crossings: usize,
}

impl CheckpointClock {
    /// Create a clock whose first checkpoint is due at `resolution`
    pub fn new(resolution: f64) -> Self {
        assert!(resolution > 0.0, "resolution must be positive");
        Self {
            next_checkpoint: resolution,
            resolution,
            crossings: 0,
        }
    }

    /// Report whether `elapsed` reached the threshold; advances it by one
    /// resolution if so
    pub fn observe(&mut self, elapsed: f64) -> bool {
        if elapsed >= self.next_checkpoint {
            self.next_checkpoint += self.resolution;
            self.crossings += 1;
            true
        } else {
            false
        }
    }

    pub fn next_checkpoint(&self) -> f64 {
        self.next_checkpoint
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Number of grid points the threshold lags behind `elapsed`
    pub fn backlog(&self, elapsed: f64) -> usize {
        if elapsed < self.next_checkpoint {
            0
        } else {
            ((elapsed - self.next_checkpoint) / self.resolution).floor() as usize + 1
        }
    }

    pub fn crossings(&self) -> usize {
        self.crossings
    }
}

/// Elapsed simulated time as a compensated sum of waiting times
///
/// A default run adds tens of millions of waiting times, many far smaller
/// than the running total. Neumaier summation keeps the lost low-order
/// bits in `carry`, so the total stays accurate to a few ulps instead of
/// drifting with the number of steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElapsedTime {
    sum: f64,
    carry: f64,
}

impl ElapsedTime {
    pub fn starting_at(time: f64) -> Self {
        Self {
            sum: time,
            carry: 0.0,
        }
    }

    /// Add one waiting time and return the new elapsed time
    pub fn advance(&mut self, tau: f64) -> f64 {
        let total = self.sum + tau;
        if self.sum.abs() >= tau.abs() {
            self.carry += (self.sum - total) + tau;
        } else {
            self.carry += (tau - total) + self.sum;
        }
        self.sum = total;
        self.value()
    }

    pub fn value(&self) -> f64 {
        self.sum + self.carry
    }
}
