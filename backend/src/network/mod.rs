//! Reaction network - Gillespie direct method
//!
//! Owns one cell's mutable state together with the (shared, immutable)
//! parameters, and advances it one reaction at a time.
//!
//! ```text
//! step:
//! 1. S = Σ propensities           (S = 0 → DegenerateSystem, S not finite
//!                                  or < 0 → InvalidPropensity; state untouched)
//! 2. draw r1, r2 ∈ (0, 1]
//! 3. t += -ln(r1) / S
//! 4. j = first index with Σ_{i≤j} a_i ≥ r2·S
//! 5. apply stoichiometry of j
//! 6. recompute all propensities at the new (state, t)
//! 7. fire_counts[j] += 1
//! 8. any count < 0 → InvalidState
//! ```

pub mod propensity;
pub mod snapshot;

pub use propensity::PropensityVector;
pub use snapshot::{compute_config_hash, validate_snapshot, NetworkSnapshot};

use crate::core::error::SimulationError;
use crate::core::time::ElapsedTime;
use crate::models::parameter::CellParameter;
use crate::models::reaction::Reaction;
use crate::models::state::CellState;
use crate::models::trajectory::FireCounts;
use crate::rng::RandomSource;
use std::sync::Arc;

/// One cell's SSA engine
///
/// # Example
///
/// ```rust
/// use hes1_ssa_core::{CellParameter, CellState, ReactionNetwork, RngManager};
///
/// let initial = CellState::from_counts([0, 0, 0, 15, 12, 0]);
/// let mut network = ReactionNetwork::new(CellParameter::default(), initial);
/// let mut rng = RngManager::new(42);
///
/// let before = network.elapsed_time();
/// network.step(&mut rng).unwrap();
/// assert!(network.elapsed_time() > before);
/// assert_eq!(network.fire_counts().total(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReactionNetwork {
    parameter: Arc<CellParameter>,
    state: CellState,
    /// Source of `state.time`; holds the summation carry
    elapsed: ElapsedTime,
    propensities: PropensityVector,
    fire_counts: FireCounts,
}

impl ReactionNetwork {
    /// Build a network at time zero
    ///
    /// The time field of `initial_state` is ignored.
    pub fn new(parameter: impl Into<Arc<CellParameter>>, initial_state: CellState) -> Self {
        let parameter = parameter.into();
        let state = initial_state.at_origin();
        let propensities = PropensityVector::evaluate(&state, &parameter);
        Self {
            parameter,
            state,
            elapsed: ElapsedTime::default(),
            propensities,
            fire_counts: FireCounts::new(),
        }
    }

    /// Execute one SSA iteration, drawing from `rng`
    ///
    /// Returns the reaction that fired.
    pub fn step<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Reaction, SimulationError> {
        self.check_total()?;
        let r1 = rng.uniform_open_unit();
        let r2 = rng.uniform_open_unit();
        self.step_with_draws(r1, r2)
    }

    /// Execute one SSA iteration with explicit uniform draws in (0, 1]
    pub fn step_with_draws(&mut self, r1: f64, r2: f64) -> Result<Reaction, SimulationError> {
        let total = self.check_total()?;
        let reaction = match self.propensities.select(r2) {
            Some(reaction) => reaction,
            None => return Err(self.degenerate(total)),
        };

        let tau = -r1.ln() / total;
        self.state.time = self.elapsed.advance(tau);

        self.apply(reaction)?;
        Ok(reaction)
    }

    /// Fire `reaction` at the current time
    ///
    /// Applies its delta, recomputes every propensity, counts the firing,
    /// then checks non-negativity.
    pub fn apply(&mut self, reaction: Reaction) -> Result<(), SimulationError> {
        self.state.apply_delta(reaction.stoichiometry());
        self.recalculate_propensities();
        self.fire_counts.increment(reaction);

        match self.state.first_negative() {
            Some(species) => Err(SimulationError::InvalidState {
                reaction: Some(reaction),
                species,
                time: self.state.time,
                state: self.state,
            }),
            None => Ok(()),
        }
    }

    /// Replace the state (keeping the supplied time) and recompute
    /// propensities
    pub fn set_state(&mut self, state: CellState) -> Result<(), SimulationError> {
        if let Some(species) = state.first_negative() {
            return Err(SimulationError::InvalidState {
                reaction: None,
                species,
                time: state.time,
                state,
            });
        }
        self.state = state;
        self.elapsed = ElapsedTime::starting_at(state.time);
        self.recalculate_propensities();
        Ok(())
    }

    fn recalculate_propensities(&mut self) {
        self.propensities = PropensityVector::evaluate(&self.state, &self.parameter);
    }

    /// Total propensity, provided a waiting time can be drawn from it
    fn check_total(&self) -> Result<f64, SimulationError> {
        let total = self.propensities.total();
        if total == 0.0 {
            Err(self.degenerate(total))
        } else if !(total > 0.0 && total.is_finite()) {
            Err(SimulationError::InvalidPropensity {
                time: self.state.time,
                total_propensity: total,
                state: self.state,
            })
        } else {
            Ok(total)
        }
    }

    fn degenerate(&self, total_propensity: f64) -> SimulationError {
        SimulationError::DegenerateSystem {
            time: self.state.time,
            total_propensity,
            state: self.state,
        }
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn elapsed_time(&self) -> f64 {
        self.state.time
    }

    pub fn fire_counts(&self) -> &FireCounts {
        &self.fire_counts
    }

    pub fn propensities(&self) -> &PropensityVector {
        &self.propensities
    }

    pub fn parameter(&self) -> &CellParameter {
        &self.parameter
    }

    /// Whether no reaction can ever fire again
    pub fn is_absorbed(&self) -> bool {
        self.propensities.total() == 0.0
    }

    /// Capture state and counters for a later [`ReactionNetwork::restore`]
    pub fn snapshot(&self) -> Result<NetworkSnapshot, SimulationError> {
        Ok(NetworkSnapshot {
            state: self.state,
            elapsed: self.elapsed,
            fire_counts: self.fire_counts,
            parameter_hash: compute_config_hash(&*self.parameter)?,
        })
    }

    /// Rebuild a network from a snapshot taken with the same parameters
    pub fn restore(
        parameter: impl Into<Arc<CellParameter>>,
        snapshot: &NetworkSnapshot,
    ) -> Result<Self, SimulationError> {
        let parameter = parameter.into();
        validate_snapshot(snapshot, &compute_config_hash(&*parameter)?)?;

        let propensities = PropensityVector::evaluate(&snapshot.state, &parameter);
        let elapsed = if snapshot.elapsed.value() == snapshot.state.time {
            snapshot.elapsed
        } else {
            ElapsedTime::starting_at(snapshot.state.time)
        };
        Ok(Self {
            parameter,
            state: snapshot.state,
            elapsed,
            propensities,
            fire_counts: snapshot.fire_counts,
        })
    }
}
