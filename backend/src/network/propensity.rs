//! Propensity vector
//!
//! All 15 propensities, always evaluated together from one
//! (state, parameter, time) triple so no entry is ever stale.

use crate::core::circadian::circadian_factor;
use crate::models::parameter::CellParameter;
use crate::models::reaction::Reaction;
use crate::models::state::CellState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PropensityVector([f64; Reaction::COUNT]);

impl PropensityVector {
    /// Evaluate every reaction's propensity at `state.time`
    pub fn evaluate(state: &CellState, param: &CellParameter) -> Self {
        let circadian = circadian_factor(state.time, param.cycle_offset, param.bmal_effect);
        let mut values = [0.0; Reaction::COUNT];
        for reaction in Reaction::ALL {
            values[reaction.index()] = reaction.propensity(state, param, circadian);
        }
        Self(values)
    }

    /// Build from raw values (test fixtures, analysis)
    pub fn from_values(values: [f64; Reaction::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, reaction: Reaction) -> f64 {
        self.0[reaction.index()]
    }

    pub fn values(&self) -> &[f64; Reaction::COUNT] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Pick the first reaction whose cumulative propensity reaches
    /// `r2 × total`
    ///
    /// Returns `None` when the total is not strictly positive. If rounding
    /// keeps the running sum just below the target, the last reaction with
    /// a positive propensity is chosen.
    ///
    /// # Example
    /// ```
    /// use hes1_ssa_core::{PropensityVector, Reaction};
    ///
    /// let mut values = [0.0; Reaction::COUNT];
    /// values[Reaction::Translation.index()] = 1.0;
    /// values[Reaction::MrnaDecay.index()] = 3.0;
    /// let props = PropensityVector::from_values(values);
    ///
    /// assert_eq!(props.select(0.75), Some(Reaction::MrnaDecay));
    /// assert_eq!(props.select(0.76), Some(Reaction::Translation));
    /// ```
    pub fn select(&self, r2: f64) -> Option<Reaction> {
        let total = self.total();
        if !(total > 0.0 && total.is_finite()) {
            return None;
        }

        let target = r2 * total;
        let mut cumulative = 0.0;
        for reaction in Reaction::ALL {
            cumulative += self.0[reaction.index()];
            if target <= cumulative {
                return Some(reaction);
            }
        }

        Reaction::ALL
            .into_iter()
            .rev()
            .find(|r| self.0[r.index()] > 0.0)
    }
}
