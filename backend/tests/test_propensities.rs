//! Propensity recomputation correctness
//!
//! After every state or time change, each propensity equals its closed
//! form evaluated on the current state, time and parameters.

use hes1_ssa_core::{
    CellParameter, CellState, PropensityVector, Reaction, ReactionNetwork, RngManager,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

/// Closed-form propensities written out independently of the crate
fn closed_form(s: &CellState, p: &CellParameter) -> [f64; 15] {
    let k = p.volume * 6e14;
    let bmal_level = (2.0 * std::f64::consts::PI * (s.time + p.cycle_offset) / 1440.0).sin() / 2.0 + 0.5;
    let circadian = 1.0 + p.bmal_effect * bmal_level;

    let protein = s.hes1_protein as f64;
    let mrna = s.hes1_mrna as f64;
    let protease = s.protease as f64;
    let dimer = s.hes1_dimer as f64;
    let hes1_free = s.hes1_free_promoter as f64;
    let protease_free = s.protease_free_promoter as f64;
    let hes1_total = p.total_hes1_promoters as f64;
    let protease_total = p.total_protease_promoters as f64;

    [
        p.hes1_mrna_decay * mrna,
        p.hes1_protein_decay * protein,
        p.dimer_decay * dimer,
        p.protease_decay * protease,
        p.association_rate * protein * protease / k,
        p.hes1_translation * mrna,
        p.dimerization_rate * protein * (protein - 1.0) / k,
        p.hes1_transcription * hes1_free * circadian,
        p.hes1_transcription / p.hes1_transcription_reduction * (hes1_total - hes1_free) * circadian,
        p.protease_transcription * protease_free,
        p.protease_transcription / p.protease_transcription_reduction * (protease_total - protease_free),
        p.hes1_promoter_bind_rate * dimer * hes1_free / k,
        p.hes1_promoter_liberation_rate * (hes1_total - hes1_free),
        p.protease_promoter_bind_rate * dimer * protease_free / k,
        p.protease_promoter_liberation_rate * (protease_total - protease_free),
    ]
}

fn assert_matches_closed_form(props: &PropensityVector, state: &CellState, param: &CellParameter) {
    let expected = closed_form(state, param);
    for reaction in Reaction::ALL {
        let got = props.get(reaction);
        let want = expected[reaction.index()];
        let scale = want.abs().max(1.0);
        assert!(
            (got - want).abs() <= TOLERANCE * scale,
            "{} at t={}: got {}, want {}",
            reaction,
            state.time,
            got,
            want
        );
        assert!(got >= 0.0, "{} negative: {}", reaction, got);
    }
}

#[test]
fn test_initial_propensities_match_closed_form() {
    let param = CellParameter::default();
    let state = CellState::from_counts([120, 40, 90_000, 9, 4, 30]);
    let network = ReactionNetwork::new(param.clone(), state);

    assert_matches_closed_form(network.propensities(), network.state(), &param);
}

#[test]
fn test_propensities_recomputed_after_every_step() {
    let param = CellParameter {
        bmal_effect: 0.9,
        cycle_offset: 200.0,
        ..Default::default()
    };
    let mut network = ReactionNetwork::new(param.clone(), CellState::from_counts([0, 0, 0, 15, 12, 0]));
    let mut rng = RngManager::new(31);

    for _ in 0..2_000 {
        network.step(&mut rng).unwrap();
        assert_matches_closed_form(network.propensities(), network.state(), &param);
    }
}

#[test]
fn test_propensities_recomputed_after_set_state() {
    let param = CellParameter::default();
    let mut network = ReactionNetwork::new(param.clone(), CellState::default());

    let mut replacement = CellState::from_counts([50, 7, 1000, 3, 11, 8]);
    replacement.time = 333.0;
    network.set_state(replacement).unwrap();

    assert_eq!(network.elapsed_time(), 333.0);
    assert_matches_closed_form(network.propensities(), network.state(), &param);
}

#[test]
fn test_circadian_modulates_only_hes1_transcription() {
    let param = CellParameter::default();
    let mut state = CellState::from_counts([10, 10, 10, 7, 5, 10]);

    state.time = 360.0; // bmal peak
    let peak = PropensityVector::evaluate(&state, &param);
    state.time = 1080.0; // bmal trough
    let trough = PropensityVector::evaluate(&state, &param);

    for reaction in Reaction::ALL {
        let modulated = matches!(
            reaction,
            Reaction::Hes1TranscriptionFree | Reaction::Hes1TranscriptionBound
        );
        if modulated {
            let ratio = peak.get(reaction) / trough.get(reaction);
            assert!((ratio - (1.0 + param.bmal_effect)).abs() < 1e-9, "{}", reaction);
        } else {
            assert_eq!(peak.get(reaction), trough.get(reaction), "{}", reaction);
        }
    }
}

#[test]
fn test_dimerization_zero_with_single_protein() {
    let param = CellParameter::default();
    let props = PropensityVector::evaluate(&CellState::from_counts([1, 0, 0, 15, 12, 0]), &param);
    assert_eq!(props.get(Reaction::Dimerization), 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_evaluate_matches_closed_form(
        protein in 0i64..10_000,
        mrna in 0i64..10_000,
        protease in 0i64..500_000,
        hes1_free in 0i64..=15,
        protease_free in 0i64..=12,
        dimer in 0i64..5_000,
        time in 0.0f64..10_000.0,
        bmal_effect in 0.0f64..1.0,
    ) {
        let param = CellParameter::default().with_bmal_effect(bmal_effect);
        let mut state = CellState::from_counts([protein, mrna, protease, hes1_free, protease_free, dimer]);
        state.time = time;

        let props = PropensityVector::evaluate(&state, &param);
        let expected = closed_form(&state, &param);
        for reaction in Reaction::ALL {
            let want = expected[reaction.index()];
            prop_assert!((props.get(reaction) - want).abs() <= TOLERANCE * want.abs().max(1.0));
        }
    }
}
