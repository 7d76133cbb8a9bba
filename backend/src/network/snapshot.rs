//! Network snapshots
//!
//! Serializable capture of a network mid-run so it can be resumed later.
//!
//! # Critical Invariants
//!
//! - **Config Matching**: a snapshot only restores into a network built
//!   from the same parameter set (checked by canonical SHA-256 hash)
//! - **Non-negativity**: a snapshot holding a negative count is rejected

use crate::core::error::SimulationError;
use crate::core::time::ElapsedTime;
use crate::models::state::CellState;
use crate::models::trajectory::FireCounts;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Everything needed to resume a [`ReactionNetwork`](super::ReactionNetwork)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// State including elapsed time
    pub state: CellState,

    /// Compensated elapsed time; ignored on restore unless it matches
    /// `state.time`
    #[serde(default)]
    pub elapsed: ElapsedTime,

    pub fire_counts: FireCounts,

    /// SHA256 of the canonical parameter JSON
    pub parameter_hash: String,
}

/// Compute deterministic SHA256 hash of a config value
///
/// Object keys are sorted recursively before hashing so the result does
/// not depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a snapshot before it is restored
pub fn validate_snapshot(
    snapshot: &NetworkSnapshot,
    expected_parameter_hash: &str,
) -> Result<(), SimulationError> {
    if snapshot.parameter_hash != expected_parameter_hash {
        return Err(SimulationError::InvalidSnapshot(format!(
            "parameter hash mismatch: snapshot {}, network {}",
            snapshot.parameter_hash, expected_parameter_hash
        )));
    }

    if let Some(species) = snapshot.state.first_negative() {
        return Err(SimulationError::InvalidSnapshot(format!(
            "negative {} count in snapshot",
            species
        )));
    }

    if !(snapshot.state.time.is_finite() && snapshot.state.time >= 0.0) {
        return Err(SimulationError::InvalidSnapshot(format!(
            "elapsed time {} is not a valid simulation time",
            snapshot.state.time
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parameter::CellParameter;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&CellParameter::default()).unwrap();
        let hash2 = compute_config_hash(&CellParameter::default()).unwrap();
        assert_eq!(hash1, hash2, "Same config should produce same hash");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let hash1 = compute_config_hash(&CellParameter::default()).unwrap();
        let hash2 = compute_config_hash(&CellParameter::default().with_bmal_effect(0.3)).unwrap();
        assert_ne!(hash1, hash2, "Different configs should produce different hashes");
    }
}
