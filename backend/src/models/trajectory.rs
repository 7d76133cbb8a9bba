//! Trajectories
//!
//! One realization of the stochastic process, sampled at checkpoints.
//!
//! # Critical Invariants
//!
//! 1. The first checkpoint is `(0, initial state)`
//! 2. Checkpoint times are strictly increasing
//! 3. Append-only: checkpoints are never edited once recorded

use crate::models::reaction::Reaction;
use crate::models::state::{CellState, Species};
use serde::{Deserialize, Serialize};

/// Snapshot of a cell at a checkpoint crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub time: f64,
    pub state: CellState,
}

impl Checkpoint {
    /// Output row: time followed by counts in [`Species::ALL`] order
    pub fn row(&self) -> (f64, [i64; Species::COUNT]) {
        (self.time, self.state.counts())
    }
}

/// Why a trajectory stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Elapsed time passed the horizon
    HorizonReached,
    /// Total propensity hit zero; the state can never change again
    Absorbed { time: f64 },
}

/// Number of times each reaction fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FireCounts([u64; Reaction::COUNT]);

impl FireCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, reaction: Reaction) {
        self.0[reaction.index()] += 1;
    }

    pub fn get(&self, reaction: Reaction) -> u64 {
        self.0[reaction.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// `(reaction, count)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (Reaction, u64)> + '_ {
        Reaction::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// One line per reaction, numbered from 1
    pub fn report(&self) -> String {
        self.iter()
            .map(|(reaction, count)| format!("Reaction {:>2} ({}): {}", reaction.index() + 1, reaction, count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Time-ordered checkpoints of one trajectory
///
/// # Example
///
/// ```rust
/// use hes1_ssa_core::{CellState, Trajectory};
///
/// let initial = CellState::from_counts([0, 0, 0, 15, 12, 0]);
/// let trajectory = Trajectory::starting_at(initial);
/// assert_eq!(trajectory.len(), 1);
/// assert_eq!(trajectory.checkpoints()[0].time, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    checkpoints: Vec<Checkpoint>,
    termination: Termination,
    steps: u64,
    fire_counts: FireCounts,
}

impl Trajectory {
    /// New trajectory holding only `(0, initial)`
    pub fn starting_at(initial: CellState) -> Self {
        Self {
            checkpoints: vec![Checkpoint {
                time: 0.0,
                state: initial.at_origin(),
            }],
            termination: Termination::HorizonReached,
            steps: 0,
            fire_counts: FireCounts::new(),
        }
    }

    /// Append a checkpoint for `state` at its own time
    ///
    /// Returns `false` (and records nothing) if the time does not advance.
    pub fn record(&mut self, state: &CellState) -> bool {
        let last = self.checkpoints.last().map_or(f64::NEG_INFINITY, |c| c.time);
        if state.time <= last {
            return false;
        }
        self.checkpoints.push(Checkpoint {
            time: state.time,
            state: *state,
        });
        true
    }

    pub(crate) fn finish(&mut self, termination: Termination, steps: u64, fire_counts: FireCounts) {
        self.termination = termination;
        self.steps = steps;
        self.fire_counts = fire_counts;
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn initial_state(&self) -> &CellState {
        &self.checkpoints[0].state
    }

    pub fn final_checkpoint(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// SSA steps executed
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn fire_counts(&self) -> &FireCounts {
        &self.fire_counts
    }

    /// Output rows in checkpoint order
    pub fn rows(&self) -> impl Iterator<Item = (f64, [i64; Species::COUNT])> + '_ {
        self.checkpoints.iter().map(Checkpoint::row)
    }
}
