//! Error taxonomy of the simulation core
//!
//! No error here is transient. Each one is a configuration mistake, a
//! modelling inconsistency, or (for `DegenerateSystem`) the process having
//! reached a state with no further transitions.

use crate::models::reaction::Reaction;
use crate::models::state::{CellState, Species};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A count went negative. Never clamped, never retried.
    #[error("Invalid state at t={time}: negative {species} count {}", describe_cause(.reaction))]
    InvalidState {
        /// Reaction that produced the state (None for a rejected input state)
        reaction: Option<Reaction>,
        species: Species,
        time: f64,
        state: CellState,
    },

    /// Total propensity is zero: no reaction can ever fire again
    #[error("Degenerate system at t={time}: total propensity {total_propensity}")]
    DegenerateSystem {
        time: f64,
        total_propensity: f64,
        state: CellState,
    },

    /// Total propensity overflowed, went NaN or went negative
    #[error("Invalid propensity at t={time}: total propensity {total_propensity}")]
    InvalidPropensity {
        time: f64,
        total_propensity: f64,
        state: CellState,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A trajectory sink could not persist a condition
    #[error("Sink error: {0}")]
    Sink(String),
}

fn describe_cause(reaction: &Option<Reaction>) -> String {
    match reaction {
        Some(reaction) => format!("after reaction '{}'", reaction),
        None => "in supplied state".to_string(),
    }
}

impl SimulationError {
    /// Whether this error marks an absorbing state rather than a failure
    pub fn is_absorbing(&self) -> bool {
        matches!(self, SimulationError::DegenerateSystem { .. })
    }
}
