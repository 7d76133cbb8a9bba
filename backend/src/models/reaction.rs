//! Reaction table
//!
//! The 15 reactions of the Hes1/protease network as a closed enumeration.
//! Each reaction carries its stoichiometric delta and its propensity
//! formula, so the SSA step iterates reactions generically instead of
//! switching on indices.

use crate::models::parameter::CellParameter;
use crate::models::state::{CellState, Species};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One elementary reaction of the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Reaction {
    MrnaDecay,
    ProteinDecay,
    DimerDecay,
    ProteaseDecay,
    /// Protein + protease → ∅ (protease-mediated degradation)
    Association,
    Translation,
    /// 2 protein → dimer
    Dimerization,
    Hes1TranscriptionFree,
    Hes1TranscriptionBound,
    ProteaseTranscriptionFree,
    ProteaseTranscriptionBound,
    Hes1PromoterBinding,
    Hes1PromoterLiberation,
    ProteasePromoterBinding,
    ProteasePromoterLiberation,
}

impl Reaction {
    pub const COUNT: usize = 15;

    /// All reactions in selection order
    pub const ALL: [Reaction; Reaction::COUNT] = [
        Reaction::MrnaDecay,
        Reaction::ProteinDecay,
        Reaction::DimerDecay,
        Reaction::ProteaseDecay,
        Reaction::Association,
        Reaction::Translation,
        Reaction::Dimerization,
        Reaction::Hes1TranscriptionFree,
        Reaction::Hes1TranscriptionBound,
        Reaction::ProteaseTranscriptionFree,
        Reaction::ProteaseTranscriptionBound,
        Reaction::Hes1PromoterBinding,
        Reaction::Hes1PromoterLiberation,
        Reaction::ProteasePromoterBinding,
        Reaction::ProteasePromoterLiberation,
    ];

    /// Position in [`Reaction::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Reaction at a position in [`Reaction::ALL`]
    pub fn from_index(index: usize) -> Option<Reaction> {
        Self::ALL.get(index).copied()
    }

    /// Change in species counts when this reaction fires once
    ///
    /// # Example
    ///
    /// ```rust
    /// use hes1_ssa_core::{Reaction, Species};
    ///
    /// assert_eq!(
    ///     Reaction::Dimerization.stoichiometry(),
    ///     &[(Species::Hes1Protein, -2), (Species::Hes1Dimer, 1)]
    /// );
    /// ```
    pub fn stoichiometry(self) -> &'static [(Species, i64)] {
        use Species::*;
        match self {
            Reaction::MrnaDecay => &[(Hes1Mrna, -1)],
            Reaction::ProteinDecay => &[(Hes1Protein, -1)],
            Reaction::DimerDecay => &[(Hes1Dimer, -1)],
            Reaction::ProteaseDecay => &[(Protease, -1)],
            Reaction::Association => &[(Hes1Protein, -1), (Protease, -1)],
            Reaction::Translation => &[(Hes1Protein, 1)],
            Reaction::Dimerization => &[(Hes1Protein, -2), (Hes1Dimer, 1)],
            Reaction::Hes1TranscriptionFree | Reaction::Hes1TranscriptionBound => &[(Hes1Mrna, 1)],
            Reaction::ProteaseTranscriptionFree | Reaction::ProteaseTranscriptionBound => {
                &[(Protease, 1)]
            }
            Reaction::Hes1PromoterBinding => &[(Hes1FreePromoter, -1), (Hes1Dimer, -1)],
            Reaction::Hes1PromoterLiberation => &[(Hes1FreePromoter, 1)],
            Reaction::ProteasePromoterBinding => &[(ProteaseFreePromoter, -1), (Hes1Dimer, -1)],
            Reaction::ProteasePromoterLiberation => &[(ProteaseFreePromoter, 1)],
        }
    }

    /// Instantaneous rate of this reaction
    ///
    /// `circadian` is the circadian factor at the state's time; only the
    /// Hes1 transcription pair is scaled by it.
    pub fn propensity(self, state: &CellState, param: &CellParameter, circadian: f64) -> f64 {
        let k = param.scale();
        let protein = state.hes1_protein as f64;
        let mrna = state.hes1_mrna as f64;
        let protease = state.protease as f64;
        let dimer = state.hes1_dimer as f64;
        let hes1_free = state.hes1_free_promoter as f64;
        let protease_free = state.protease_free_promoter as f64;
        let hes1_bound = (param.total_hes1_promoters - state.hes1_free_promoter) as f64;
        let protease_bound = (param.total_protease_promoters - state.protease_free_promoter) as f64;

        match self {
            Reaction::MrnaDecay => param.hes1_mrna_decay * mrna,
            Reaction::ProteinDecay => param.hes1_protein_decay * protein,
            Reaction::DimerDecay => param.dimer_decay * dimer,
            Reaction::ProteaseDecay => param.protease_decay * protease,
            Reaction::Association => param.association_rate * protein * protease / k,
            Reaction::Translation => param.hes1_translation * mrna,
            Reaction::Dimerization => param.dimerization_rate * protein * (protein - 1.0) / k,
            Reaction::Hes1TranscriptionFree => param.hes1_transcription * hes1_free * circadian,
            Reaction::Hes1TranscriptionBound => {
                param.hes1_transcription / param.hes1_transcription_reduction * hes1_bound * circadian
            }
            Reaction::ProteaseTranscriptionFree => param.protease_transcription * protease_free,
            Reaction::ProteaseTranscriptionBound => {
                param.protease_transcription / param.protease_transcription_reduction * protease_bound
            }
            Reaction::Hes1PromoterBinding => param.hes1_promoter_bind_rate * dimer * hes1_free / k,
            Reaction::Hes1PromoterLiberation => param.hes1_promoter_liberation_rate * hes1_bound,
            Reaction::ProteasePromoterBinding => {
                param.protease_promoter_bind_rate * dimer * protease_free / k
            }
            Reaction::ProteasePromoterLiberation => {
                param.protease_promoter_liberation_rate * protease_bound
            }
        }
    }

    /// Short human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Reaction::MrnaDecay => "hes1 mRNA decay",
            Reaction::ProteinDecay => "Hes1 protein decay",
            Reaction::DimerDecay => "Hes1 dimer decay",
            Reaction::ProteaseDecay => "protease decay",
            Reaction::Association => "Hes1/protease association",
            Reaction::Translation => "Hes1 translation",
            Reaction::Dimerization => "Hes1 dimerization",
            Reaction::Hes1TranscriptionFree => "hes1 transcription (free promoter)",
            Reaction::Hes1TranscriptionBound => "hes1 transcription (bound promoter)",
            Reaction::ProteaseTranscriptionFree => "protease transcription (free promoter)",
            Reaction::ProteaseTranscriptionBound => "protease transcription (bound promoter)",
            Reaction::Hes1PromoterBinding => "dimer binds hes1 promoter",
            Reaction::Hes1PromoterLiberation => "hes1 promoter liberation",
            Reaction::ProteasePromoterBinding => "dimer binds protease promoter",
            Reaction::ProteasePromoterLiberation => "protease promoter liberation",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
