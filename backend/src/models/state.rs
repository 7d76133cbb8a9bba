//! Cell State
//!
//! Molecule and promoter counts of one cell plus the simulated time they
//! were observed at.
//!
//! # Critical Invariants
//!
//! 1. **Non-negativity**: every count is ≥ 0 at every observable point
//! 2. **Monotonic time**: `time` never decreases while a network owns the state
//!
//! Counts are signed on purpose: a reaction that overdraws a species must
//! surface as a negative count (and an `InvalidState` error) instead of
//! wrapping around.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Species tracked by the model, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Hes1Protein,
    Hes1Mrna,
    Protease,
    Hes1FreePromoter,
    ProteaseFreePromoter,
    Hes1Dimer,
}

impl Species {
    pub const COUNT: usize = 6;

    /// All species in output column order
    pub const ALL: [Species; Species::COUNT] = [
        Species::Hes1Protein,
        Species::Hes1Mrna,
        Species::Protease,
        Species::Hes1FreePromoter,
        Species::ProteaseFreePromoter,
        Species::Hes1Dimer,
    ];

    /// Column header used in trajectory output
    pub fn column_name(self) -> &'static str {
        match self {
            Species::Hes1Protein => "numHes1Protein",
            Species::Hes1Mrna => "numHes1mRNA",
            Species::Protease => "numProtease",
            Species::Hes1FreePromoter => "numHes1FreePromoter",
            Species::ProteaseFreePromoter => "numProteaseFreePromoter",
            Species::Hes1Dimer => "numHes1Dimer",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Complete state of one simulated cell
///
/// # Example
///
/// ```rust
/// use hes1_ssa_core::{CellState, Species};
///
/// let state = CellState::from_counts([0, 0, 0, 15, 12, 0]);
/// assert_eq!(state.time, 0.0);
/// assert_eq!(state.count(Species::Hes1FreePromoter), 15);
/// assert!(state.first_negative().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellState {
    /// Simulated time elapsed (minutes)
    ///
    /// Plain `f64`; a running network accumulates it through
    /// [`ElapsedTime`](crate::core::time::ElapsedTime) so millions of small
    /// waiting times do not lose precision.
    pub time: f64,
    pub hes1_protein: i64,
    pub hes1_mrna: i64,
    pub protease: i64,
    pub hes1_free_promoter: i64,
    pub protease_free_promoter: i64,
    pub hes1_dimer: i64,
}

impl CellState {
    /// Build a state at time 0 from counts in [`Species::ALL`] order
    pub fn from_counts(counts: [i64; Species::COUNT]) -> Self {
        let [hes1_protein, hes1_mrna, protease, hes1_free_promoter, protease_free_promoter, hes1_dimer] =
            counts;
        Self {
            time: 0.0,
            hes1_protein,
            hes1_mrna,
            protease,
            hes1_free_promoter,
            protease_free_promoter,
            hes1_dimer,
        }
    }

    /// Counts in [`Species::ALL`] order
    pub fn counts(&self) -> [i64; Species::COUNT] {
        [
            self.hes1_protein,
            self.hes1_mrna,
            self.protease,
            self.hes1_free_promoter,
            self.protease_free_promoter,
            self.hes1_dimer,
        ]
    }

    /// Count of a single species
    pub fn count(&self, species: Species) -> i64 {
        match species {
            Species::Hes1Protein => self.hes1_protein,
            Species::Hes1Mrna => self.hes1_mrna,
            Species::Protease => self.protease,
            Species::Hes1FreePromoter => self.hes1_free_promoter,
            Species::ProteaseFreePromoter => self.protease_free_promoter,
            Species::Hes1Dimer => self.hes1_dimer,
        }
    }

    fn count_mut(&mut self, species: Species) -> &mut i64 {
        match species {
            Species::Hes1Protein => &mut self.hes1_protein,
            Species::Hes1Mrna => &mut self.hes1_mrna,
            Species::Protease => &mut self.protease,
            Species::Hes1FreePromoter => &mut self.hes1_free_promoter,
            Species::ProteaseFreePromoter => &mut self.protease_free_promoter,
            Species::Hes1Dimer => &mut self.hes1_dimer,
        }
    }

    /// Apply a stoichiometric delta without any clamping
    pub fn apply_delta(&mut self, delta: &[(Species, i64)]) {
        for &(species, change) in delta {
            *self.count_mut(species) += change;
        }
    }

    /// First species whose count is negative, if any
    pub fn first_negative(&self) -> Option<Species> {
        Species::ALL.into_iter().find(|&s| self.count(s) < 0)
    }

    /// Same counts with the time reset to zero
    pub fn at_origin(mut self) -> Self {
        self.time = 0.0;
        self
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: Hes1 Prot.: {:>5}, hes1 mRNA: {:>5}, Protease: {:>5}, \
             Free hes1 prom.: {:>3}, Free prot. prom.: {:>3}, Hes1 Dimer: {:>5} }}",
            self.hes1_protein,
            self.hes1_mrna,
            self.protease,
            self.hes1_free_promoter,
            self.protease_free_promoter,
            self.hes1_dimer
        )
    }
}
