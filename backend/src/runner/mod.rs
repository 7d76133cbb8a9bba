//! Trajectory runner
//!
//! Drives one [`ReactionNetwork`] from time zero past a horizon, sampling
//! its state on a fixed checkpoint grid.
//!
//! ```text
//! record (0, initial)
//! do:
//!     step
//!     if t ≥ next_checkpoint: record (t, state), next_checkpoint += resolution,
//!                             report min(t / horizon, 1)
//! while t ≤ horizon
//! ```
//!
//! The recorded time is the observed event time, not the grid point. A
//! step that jumps over several grid points produces one record; the
//! threshold then catches up one resolution per subsequent step.

pub mod progress;

pub use progress::{NoProgress, ProgressBoard, ProgressCell, ProgressSink};

use crate::core::error::SimulationError;
use crate::core::time::CheckpointClock;
use crate::models::parameter::CellParameter;
use crate::models::state::CellState;
use crate::models::trajectory::{Termination, Trajectory};
use crate::network::ReactionNetwork;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Time horizon and checkpoint spacing of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunWindow {
    /// Stop once elapsed time exceeds this (minutes)
    pub horizon: f64,
    /// Checkpoint grid spacing (minutes)
    pub resolution: f64,
}

impl RunWindow {
    pub fn new(horizon: f64, resolution: f64) -> Self {
        Self { horizon, resolution }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "horizon must be positive and finite, got {}",
                self.horizon
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "resolution must be positive and finite, got {}",
                self.resolution
            )));
        }
        Ok(())
    }

    /// Checkpoints on the grid up to the horizon, including time zero
    pub fn grid_points(&self) -> usize {
        (self.horizon / self.resolution).floor() as usize + 1
    }
}

/// Runs trajectories for one parameter set
///
/// # Example
///
/// ```rust
/// use hes1_ssa_core::{CellParameter, CellState, NoProgress, RngManager, RunWindow, TrajectoryRunner};
///
/// let runner = TrajectoryRunner::new(CellParameter::default(), RunWindow::new(1.0, 0.25)).unwrap();
/// let initial = CellState::from_counts([0, 0, 0, 15, 12, 0]);
/// let trajectory = runner.run(initial, &mut RngManager::new(7), &NoProgress).unwrap();
///
/// assert_eq!(trajectory.checkpoints()[0].state, initial);
/// assert!(trajectory.len() >= 2);
/// ```
#[derive(Debug, Clone)]
pub struct TrajectoryRunner {
    parameter: Arc<CellParameter>,
    window: RunWindow,
}

impl TrajectoryRunner {
    pub fn new(
        parameter: impl Into<Arc<CellParameter>>,
        window: RunWindow,
    ) -> Result<Self, SimulationError> {
        let parameter = parameter.into();
        parameter.validate()?;
        window.validate()?;
        Ok(Self { parameter, window })
    }

    pub fn window(&self) -> RunWindow {
        self.window
    }

    pub fn parameter(&self) -> &CellParameter {
        &self.parameter
    }

    /// Check a candidate initial state against this runner's parameters
    pub fn check_initial_state(&self, initial: &CellState) -> Result<(), SimulationError> {
        if let Some(species) = initial.first_negative() {
            return Err(SimulationError::InvalidState {
                reaction: None,
                species,
                time: 0.0,
                state: initial.at_origin(),
            });
        }
        if initial.hes1_free_promoter > self.parameter.total_hes1_promoters
            || initial.protease_free_promoter > self.parameter.total_protease_promoters
        {
            return Err(SimulationError::InvalidConfig(format!(
                "free promoters ({}, {}) exceed totals ({}, {})",
                initial.hes1_free_promoter,
                initial.protease_free_promoter,
                self.parameter.total_hes1_promoters,
                self.parameter.total_protease_promoters
            )));
        }
        Ok(())
    }

    /// Simulate from `initial` until elapsed time exceeds the horizon
    ///
    /// An absorbing state (total propensity zero) ends the run early with
    /// [`Termination::Absorbed`]; the held state is then recorded once more
    /// at the horizon. An invalid state is returned as an error.
    pub fn run<R, P>(
        &self,
        initial: CellState,
        rng: &mut R,
        progress: &P,
    ) -> Result<Trajectory, SimulationError>
    where
        R: RandomSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.check_initial_state(&initial)?;

        let horizon = self.window.horizon;
        let mut network = ReactionNetwork::new(Arc::clone(&self.parameter), initial);
        let mut trajectory = Trajectory::starting_at(initial);
        let mut clock = CheckpointClock::new(self.window.resolution);
        let mut steps: u64 = 0;

        let termination = loop {
            match network.step(rng) {
                Ok(_) => steps += 1,
                Err(e) if e.is_absorbing() => {
                    break Termination::Absorbed {
                        time: network.elapsed_time(),
                    };
                }
                Err(e) => return Err(e),
            }

            let elapsed = network.elapsed_time();
            if clock.observe(elapsed) {
                trajectory.record(network.state());
                progress.report((elapsed / horizon).min(1.0));
            }

            if elapsed > horizon {
                break Termination::HorizonReached;
            }
        };

        if let Termination::Absorbed { time } = termination {
            warn!(time = time, steps = steps, "Trajectory absorbed before horizon");
            let held = CellState {
                time: horizon,
                ..*network.state()
            };
            trajectory.record(&held);
            progress.report(1.0);
        }

        debug!(
            steps = steps,
            checkpoints = trajectory.len(),
            elapsed = network.elapsed_time(),
            "Trajectory complete"
        );

        trajectory.finish(termination, steps, *network.fire_counts());
        Ok(trajectory)
    }
}
