//! Network snapshot tests
//!
//! Critical invariants tested:
//! - A restored network continues exactly like the original
//! - Snapshots only restore into a network with the same parameters
//! - Corrupt snapshots are rejected

use hes1_ssa_core::network::compute_config_hash;
use hes1_ssa_core::{CellParameter, CellState, NetworkSnapshot, ReactionNetwork, RngManager, SimulationError};

fn running_network(steps: usize, seed: u64) -> (ReactionNetwork, RngManager) {
    let mut rng = RngManager::new(seed);
    let mut network =
        ReactionNetwork::new(CellParameter::default(), CellState::from_counts([0, 0, 0, 15, 12, 0]));
    for _ in 0..steps {
        network.step(&mut rng).unwrap();
    }
    (network, rng)
}

#[test]
fn test_snapshot_restore_continues_identically() {
    let (mut original, mut rng) = running_network(500, 31);
    let snapshot = original.snapshot().unwrap();
    let rng_state = rng.get_state();

    let mut restored = ReactionNetwork::restore(CellParameter::default(), &snapshot).unwrap();
    let mut restored_rng = RngManager::new(rng_state);

    assert_eq!(restored.state(), original.state());
    assert_eq!(restored.fire_counts(), original.fire_counts());
    assert_eq!(restored.propensities(), original.propensities());

    for _ in 0..500 {
        let a = original.step(&mut rng).unwrap();
        let b = restored.step(&mut restored_rng).unwrap();
        assert_eq!(a, b);
    }
    assert_eq!(restored.state(), original.state());
    assert_eq!(restored.elapsed_time(), original.elapsed_time());
}

#[test]
fn test_snapshot_keeps_compensated_time() {
    let (network, _) = running_network(2_000, 13);
    let snapshot = network.snapshot().unwrap();
    assert_eq!(snapshot.elapsed.value(), snapshot.state.time);

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: NetworkSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.elapsed, snapshot.elapsed);
}

#[test]
fn test_snapshot_json_roundtrip() {
    let (network, _) = running_network(100, 5);
    let snapshot = network.snapshot().unwrap();

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: NetworkSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, snapshot);
    assert!(ReactionNetwork::restore(CellParameter::default(), &parsed).is_ok());
}

#[test]
fn test_restore_with_different_parameters_rejected() {
    let (network, _) = running_network(50, 8);
    let snapshot = network.snapshot().unwrap();

    let other = CellParameter::default().with_bmal_effect(0.3);
    let err = ReactionNetwork::restore(other, &snapshot).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidSnapshot(_)));
}

#[test]
fn test_negative_snapshot_rejected() {
    let (network, _) = running_network(50, 8);
    let mut snapshot = network.snapshot().unwrap();
    snapshot.state.protease = -1;

    let err = ReactionNetwork::restore(CellParameter::default(), &snapshot).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidSnapshot(_)));
}

#[test]
fn test_negative_time_snapshot_rejected() {
    let (network, _) = running_network(10, 2);
    let mut snapshot = network.snapshot().unwrap();
    snapshot.state.time = -5.0;

    let err = ReactionNetwork::restore(CellParameter::default(), &snapshot).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidSnapshot(_)));
}

#[test]
fn test_parameter_hash_sensitive_to_small_changes() {
    let base = CellParameter::default();
    let nudged = CellParameter {
        dimer_decay: base.dimer_decay + 1e-9,
        ..base.clone()
    };
    assert_ne!(
        compute_config_hash(&base).unwrap(),
        compute_config_hash(&nudged).unwrap()
    );
}
