//! Cell Parameters
//!
//! Immutable rate constants and sizes of the Hes1/protease network. A
//! parameter set is shared read-only by every trajectory of one experiment
//! condition; sweeps derive a new value per condition instead of mutating.

use crate::core::error::SimulationError;
use serde::{Deserialize, Serialize};

/// Molecules per (volume unit × concentration unit)
///
/// Converts bimolecular rate constants into propensities:
/// `K = volume × AVOGADRO_SCALE`.
pub const AVOGADRO_SCALE: f64 = 6e14;

/// Rate constants and system sizes for one cell
///
/// Missing fields in a serialized parameter file fall back to the
/// published values returned by [`CellParameter::default`].
///
/// # Example
///
/// ```rust
/// use hes1_ssa_core::CellParameter;
///
/// let base = CellParameter::default();
/// let weak_drive = base.with_bmal_effect(0.3);
/// assert_eq!(weak_drive.bmal_effect, 0.3);
/// assert_eq!(base.bmal_effect, 0.7);
/// assert!(weak_drive.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellParameter {
    /// Cell volume (litres)
    pub volume: f64,

    pub total_hes1_promoters: i64,
    pub total_protease_promoters: i64,

    pub hes1_protein_decay: f64,
    pub hes1_mrna_decay: f64,
    pub protease_decay: f64,
    pub dimer_decay: f64,

    pub hes1_transcription: f64,
    pub hes1_translation: f64,
    /// Divisor applied to transcription from a bound Hes1 promoter
    pub hes1_transcription_reduction: f64,

    pub protease_transcription: f64,
    /// Divisor applied to transcription from a bound protease promoter
    pub protease_transcription_reduction: f64,

    /// Hes1 protein + protease association (degradation) rate
    pub association_rate: f64,

    pub hes1_promoter_bind_rate: f64,
    pub hes1_promoter_liberation_rate: f64,
    pub protease_promoter_bind_rate: f64,
    pub protease_promoter_liberation_rate: f64,

    pub dimerization_rate: f64,

    /// Amplitude of the circadian modulation of Hes1 transcription
    pub bmal_effect: f64,
    /// Phase offset of the circadian drive (minutes)
    pub cycle_offset: f64,
}

impl Default for CellParameter {
    fn default() -> Self {
        Self {
            volume: 1.3e-12,
            total_hes1_promoters: 15,
            total_protease_promoters: 12,
            hes1_protein_decay: 0.108,
            hes1_mrna_decay: 0.028,
            protease_decay: 0.1,
            dimer_decay: 0.036,
            hes1_transcription: 3.0,
            hes1_translation: 1.0,
            hes1_transcription_reduction: 100.0,
            protease_transcription: 1000.0,
            protease_transcription_reduction: 138.0,
            association_rate: 0.03,
            hes1_promoter_bind_rate: 0.5,
            hes1_promoter_liberation_rate: 0.096,
            protease_promoter_bind_rate: 150.0,
            protease_promoter_liberation_rate: 15.0,
            dimerization_rate: 1.0,
            bmal_effect: 0.7,
            cycle_offset: 0.0,
        }
    }
}

impl CellParameter {
    /// Molecule-count scale factor `K = volume × 6e14`
    pub fn scale(&self) -> f64 {
        self.volume * AVOGADRO_SCALE
    }

    /// Copy with a different circadian amplitude
    pub fn with_bmal_effect(&self, bmal_effect: f64) -> Self {
        Self {
            bmal_effect,
            ..self.clone()
        }
    }

    /// Copy with a different circadian phase offset
    pub fn with_cycle_offset(&self, cycle_offset: f64) -> Self {
        Self {
            cycle_offset,
            ..self.clone()
        }
    }

    /// Named rate constants, for validation and reporting
    pub fn rates(&self) -> [(&'static str, f64); 17] {
        [
            ("hes1_protein_decay", self.hes1_protein_decay),
            ("hes1_mrna_decay", self.hes1_mrna_decay),
            ("protease_decay", self.protease_decay),
            ("dimer_decay", self.dimer_decay),
            ("hes1_transcription", self.hes1_transcription),
            ("hes1_translation", self.hes1_translation),
            ("hes1_transcription_reduction", self.hes1_transcription_reduction),
            ("protease_transcription", self.protease_transcription),
            ("protease_transcription_reduction", self.protease_transcription_reduction),
            ("association_rate", self.association_rate),
            ("hes1_promoter_bind_rate", self.hes1_promoter_bind_rate),
            ("hes1_promoter_liberation_rate", self.hes1_promoter_liberation_rate),
            ("protease_promoter_bind_rate", self.protease_promoter_bind_rate),
            ("protease_promoter_liberation_rate", self.protease_promoter_liberation_rate),
            ("dimerization_rate", self.dimerization_rate),
            ("bmal_effect", self.bmal_effect),
            ("cycle_offset", self.cycle_offset),
        ]
    }

    /// Check that every propensity this parameter set can produce is a
    /// finite, non-negative number
    ///
    /// `bmal_effect` may not drop below -1, otherwise the circadian factor
    /// `1 + bmal_effect × level` can turn negative.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.volume.is_normal() && self.volume > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "volume must be positive, finite and not subnormal, got {}",
                self.volume
            )));
        }
        if !(self.scale().is_normal() && self.scale().recip().is_finite()) {
            return Err(SimulationError::InvalidConfig(format!(
                "volume {} gives an unusable molecule scale K = {}",
                self.volume,
                self.scale()
            )));
        }

        for (name, value) in self.rates() {
            if !value.is_finite() {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in self.rates() {
            let signed = matches!(name, "bmal_effect" | "cycle_offset");
            if !signed && value < 0.0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.hes1_transcription_reduction <= 0.0 || self.protease_transcription_reduction <= 0.0 {
            return Err(SimulationError::InvalidConfig(
                "transcription reduction factors must be positive".to_string(),
            ));
        }

        if self.bmal_effect < -1.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "bmal_effect below -1 makes the circadian factor negative, got {}",
                self.bmal_effect
            )));
        }

        if self.total_hes1_promoters < 0 || self.total_protease_promoters < 0 {
            return Err(SimulationError::InvalidConfig(
                "promoter totals must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}
