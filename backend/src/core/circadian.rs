//! Circadian drive
//!
//! BMAL1 level oscillates with a 24h period (1440 minutes) between 0 and 1
//! and multiplies Hes1 transcription by `1 + bmal_effect × level`.

use std::f64::consts::PI;

/// Circadian period in simulated minutes
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// BMAL1 level in [0, 1] at time `t` (minutes)
pub fn bmal_level(t: f64, cycle_offset: f64) -> f64 {
    (2.0 * PI * (t + cycle_offset) / MINUTES_PER_DAY).sin() / 2.0 + 0.5
}

/// Multiplicative factor applied to Hes1 transcription at time `t`
///
/// # Example
/// ```
/// use hes1_ssa_core::core::circadian::circadian_factor;
///
/// // sin(0) = 0 → level 0.5
/// assert!((circadian_factor(0.0, 0.0, 0.4) - 1.2).abs() < 1e-12);
/// ```
pub fn circadian_factor(t: f64, cycle_offset: f64, bmal_effect: f64) -> f64 {
    1.0 + bmal_effect * bmal_level(t, cycle_offset)
}
