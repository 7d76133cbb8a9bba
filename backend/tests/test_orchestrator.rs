//! Experiment orchestrator tests
//!
//! Critical invariants tested:
//! - One failing trajectory never aborts its siblings
//! - Conditions run in order and never share random streams
//! - Per-trajectory seeding is reproducible from the root seed
//! - Manifest tallies match the collected outcomes

use hes1_ssa_core::orchestrator::{
    CollectingSink, Condition, ConditionResult, ExperimentConfig, ExperimentOrchestrator,
    ProgressReporter, SilentReporter, SweepParameter, TrajectorySink,
};
use hes1_ssa_core::{
    CellParameter, CellState, ProgressBoard, Reaction, SeedPolicy, SimulationError, Termination,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn small_config(cells: usize, policy: SeedPolicy) -> ExperimentConfig {
    ExperimentConfig {
        cell_count: cells,
        horizon: 0.2,
        resolution: 0.05,
        seed_policy: policy,
        poll_interval_ms: 5,
        worker_threads: Some(4),
    }
}

fn orchestrator(cells: usize, root_seed: u64) -> ExperimentOrchestrator {
    ExperimentOrchestrator::new(small_config(cells, SeedPolicy::PerTrajectory { root_seed }))
        .unwrap()
        .with_reporter(SilentReporter)
}

fn good_state() -> CellState {
    CellState::from_counts([30, 8, 4_000, 12, 2, 5])
}

fn single_condition() -> Vec<Condition> {
    vec![Condition::new("baseline", CellParameter::default())]
}

/// Reporter that counts its callbacks
#[derive(Clone, Default)]
struct CountingReporter {
    polls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl ProgressReporter for CountingReporter {
    fn on_poll(&mut self, _condition: &Condition, _board: &ProgressBoard) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_condition_complete(&mut self, _result: &ConditionResult) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

struct FailingSink;

impl TrajectorySink for FailingSink {
    fn persist(&mut self, _result: ConditionResult) -> Result<(), SimulationError> {
        Err(SimulationError::Sink("disk full".to_string()))
    }
}

// ============================================================================
// Failure isolation
// ============================================================================

#[test]
fn test_failing_trajectories_do_not_abort_siblings() {
    let negative = CellState::from_counts([0, -1, 0, 15, 12, 0]);
    let overfull = CellState::from_counts([0, 0, 0, 99, 12, 0]);
    let pool = vec![good_state(), negative, overfull];

    let mut orch = orchestrator(24, 3);
    let result = orch.run_condition(&single_condition()[0], &pool).unwrap();

    assert_eq!(result.outcomes.len(), 24);
    for (i, outcome) in result.outcomes.iter().enumerate() {
        assert_eq!(outcome.cell, i);
        if outcome.initial_state == good_state() {
            assert!(outcome.trajectory().is_some(), "cell {} should succeed", i);
        } else if outcome.initial_state == negative {
            assert!(matches!(outcome.error(), Some(SimulationError::InvalidState { .. })));
        } else {
            assert!(matches!(outcome.error(), Some(SimulationError::InvalidConfig(_))));
        }
    }
    assert_eq!(
        result.completed_count() + result.absorbed_count() + result.failed_count(),
        24
    );
}

#[test]
fn test_all_trajectories_failing_still_returns_condition() {
    let pool = vec![CellState::from_counts([-5, 0, 0, 15, 12, 0])];

    let mut orch = orchestrator(6, 1);
    let result = orch.run_condition(&single_condition()[0], &pool).unwrap();

    assert_eq!(result.failed_count(), 6);
    assert_eq!(result.trajectories().count(), 0);
    assert!(orch.board().all_done());
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_empty_pool_rejected() {
    let mut orch = orchestrator(4, 1);
    let err = orch.collect_experiment(&single_condition(), &[]).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidConfig(_)));
}

#[test]
fn test_invalid_condition_parameters_rejected() {
    let bad = Condition::new(
        "broken",
        CellParameter {
            volume: 0.0,
            ..Default::default()
        },
    );
    let mut orch = orchestrator(4, 1);
    let err = orch.run_condition(&bad, &[good_state()]).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidConfig(_)));
}

#[test]
fn test_invalid_config_rejected() {
    let config = ExperimentConfig {
        cell_count: 0,
        ..small_config(1, SeedPolicy::default())
    };
    assert!(matches!(
        ExperimentOrchestrator::new(config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

// ============================================================================
// Seeding and sweep isolation
// ============================================================================

#[test]
fn test_same_root_seed_reproduces_experiment() {
    let pool = vec![good_state(), CellState::from_counts([0, 0, 0, 15, 12, 0])];
    let conditions =
        Condition::sweep(&CellParameter::default(), SweepParameter::BmalEffect, &[0.3, 0.7]);

    let a = orchestrator(6, 77).collect_experiment(&conditions, &pool).unwrap();
    let b = orchestrator(6, 77).collect_experiment(&conditions, &pool).unwrap();

    assert_eq!(a.len(), 2);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.condition, y.condition);
        assert_eq!(x.outcomes, y.outcomes);
    }
}

#[test]
fn test_different_root_seeds_differ() {
    let pool = vec![good_state()];
    let a = orchestrator(2, 1).collect_experiment(&single_condition(), &pool).unwrap();
    let b = orchestrator(2, 2).collect_experiment(&single_condition(), &pool).unwrap();
    assert_ne!(a[0].outcomes, b[0].outcomes);
}

#[test]
fn test_cells_within_condition_use_distinct_streams() {
    let mut orch = orchestrator(2, 12);
    let result = orch.run_condition(&single_condition()[0], &[good_state()]).unwrap();

    let first = result.outcomes[0].trajectory().unwrap();
    let second = result.outcomes[1].trajectory().unwrap();
    assert_ne!(first.checkpoints(), second.checkpoints());
}

#[test]
fn test_repeated_condition_gets_fresh_streams() {
    let condition = Condition::new("same", CellParameter::default());
    let conditions = vec![condition.clone(), condition];

    let results = orchestrator(3, 5)
        .collect_experiment(&conditions, &[good_state()])
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_ne!(results[0].outcomes, results[1].outcomes);
}

/// Mean final protease count and pooled reaction shares of one condition
fn condition_statistics(result: &ConditionResult) -> (f64, [f64; Reaction::COUNT]) {
    let trajectories: Vec<_> = result.trajectories().map(|(_, t)| t).collect();
    assert!(!trajectories.is_empty());

    let mean_protease = trajectories
        .iter()
        .map(|t| t.final_checkpoint().state.protease as f64)
        .sum::<f64>()
        / trajectories.len() as f64;

    let mut fired = [0u64; Reaction::COUNT];
    for trajectory in &trajectories {
        for (reaction, count) in trajectory.fire_counts().iter() {
            fired[reaction.index()] += count;
        }
    }
    let total: u64 = fired.iter().sum();
    let mut shares = [0.0; Reaction::COUNT];
    for (share, &count) in shares.iter_mut().zip(&fired) {
        *share = count as f64 / total as f64;
    }
    (mean_protease, shares)
}

#[test]
fn test_independent_streams_agree_in_distribution() {
    let config = |root_seed| ExperimentConfig {
        cell_count: 32,
        horizon: 0.5,
        resolution: 0.1,
        seed_policy: SeedPolicy::PerTrajectory { root_seed },
        poll_interval_ms: 5,
        worker_threads: Some(4),
    };
    let run = |root_seed| {
        ExperimentOrchestrator::new(config(root_seed))
            .unwrap()
            .with_reporter(SilentReporter)
            .run_condition(&single_condition()[0], &[good_state()])
            .unwrap()
    };

    let a = run(101);
    let b = run(202);
    assert_ne!(a.outcomes, b.outcomes);

    let (protease_a, shares_a) = condition_statistics(&a);
    let (protease_b, shares_b) = condition_statistics(&b);

    // Protease grows by several hundred over half a minute; per-cell spread
    // is tens of molecules, so means of 32 cells agree to well under 2%.
    assert!(
        (protease_a - protease_b).abs() < 0.02 * protease_a,
        "mean protease {} vs {}",
        protease_a,
        protease_b
    );
    for reaction in Reaction::ALL {
        let (x, y) = (shares_a[reaction.index()], shares_b[reaction.index()]);
        assert!((x - y).abs() < 0.02, "{}: share {} vs {}", reaction, x, y);
    }
}

#[test]
fn test_sweep_results_in_condition_order() {
    let conditions = Condition::sweep(
        &CellParameter::default(),
        SweepParameter::BmalEffect,
        &[0.0, 0.5, 1.0],
    );

    let results = orchestrator(3, 9)
        .collect_experiment(&conditions, &[good_state()])
        .unwrap();

    let labels: Vec<_> = results.iter().map(|r| r.condition.label.as_str()).collect();
    assert_eq!(labels, ["bmal0", "bmal50", "bmal100"]);
    assert_eq!(results[1].condition.parameter.bmal_effect, 0.5);
    for result in &results {
        assert_eq!(result.outcomes.len(), 3);
        assert_eq!(result.failed_count(), 0);
    }
}

#[test]
fn test_shared_generator_mode_runs_every_cell() {
    let config = small_config(5, SeedPolicy::Shared { seed: 42 });
    let mut orch = ExperimentOrchestrator::new(config)
        .unwrap()
        .with_reporter(SilentReporter);

    let result = orch.run_condition(&single_condition()[0], &[good_state()]).unwrap();

    assert_eq!(result.outcomes.len(), 5);
    assert_eq!(result.failed_count(), 0);
    for (_, trajectory) in result.trajectories() {
        assert_eq!(trajectory.checkpoints()[0].state, good_state());
        assert_eq!(trajectory.termination(), Termination::HorizonReached);
    }
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn test_sampling_covers_pool_and_resets_time() {
    let mut pool: Vec<CellState> = (0..3)
        .map(|i| CellState::from_counts([i, 0, 0, 15, 12, 0]))
        .collect();
    pool[2].time = 12.5;

    let mut orch = orchestrator(300, 4);
    let sampled = orch.sample_initial_states(&pool).unwrap();

    assert_eq!(sampled.len(), 300);
    for i in 0..3 {
        assert!(sampled.iter().any(|s| s.hes1_protein == i), "pool entry {} never drawn", i);
    }
    assert!(sampled.iter().all(|s| s.time == 0.0));
}

// ============================================================================
// Progress, reporting and manifest
// ============================================================================

#[test]
fn test_progress_board_complete_after_condition() {
    let mut orch = orchestrator(4, 6);
    orch.run_condition(&single_condition()[0], &[good_state()]).unwrap();

    assert!(orch.board().all_done());
    assert_eq!(orch.board().done_count(), 4);
    for cell in orch.board().cells() {
        assert!(cell.fraction() > 0.5 && cell.fraction() <= 1.0);
    }
}

#[test]
fn test_reporter_callbacks() {
    let reporter = CountingReporter::default();
    let mut orch = ExperimentOrchestrator::new(small_config(2, SeedPolicy::default()))
        .unwrap()
        .with_reporter(reporter.clone());

    let conditions =
        Condition::sweep(&CellParameter::default(), SweepParameter::CycleOffset, &[0.0, 360.0]);
    orch.collect_experiment(&conditions, &[good_state()]).unwrap();

    assert!(reporter.polls.load(Ordering::SeqCst) >= 2);
    assert_eq!(reporter.completed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_manifest_tallies_outcomes() {
    let pool = vec![good_state(), CellState::from_counts([0, 0, -2, 15, 12, 0])];
    let conditions =
        Condition::sweep(&CellParameter::default(), SweepParameter::BmalEffect, &[0.3, 0.7]);

    let mut sink = CollectingSink::default();
    let manifest = orchestrator(8, 21)
        .run_experiment(&conditions, &pool, &mut sink)
        .unwrap();

    assert_eq!(manifest.conditions.len(), 2);
    assert_eq!(sink.results.len(), 2);
    for (summary, result) in manifest.conditions.iter().zip(&sink.results) {
        assert_eq!(summary.label, result.condition.label);
        assert_eq!(summary.total(), 8);
        assert_eq!(summary.failed, result.failed_count());
        assert_eq!(summary.failures.len(), summary.failed);
        assert_eq!(summary.parameter_hash.len(), 64);
    }
    assert_ne!(
        manifest.conditions[0].parameter_hash,
        manifest.conditions[1].parameter_hash
    );
    assert_eq!(
        manifest.total_failures(),
        sink.results.iter().map(|r| r.failed_count()).sum::<usize>()
    );

    let json = manifest.to_json().unwrap();
    assert!(json.contains("bmal30"));
    assert!(json.contains("bmal70"));
}

#[test]
fn test_sink_error_stops_experiment() {
    let conditions =
        Condition::sweep(&CellParameter::default(), SweepParameter::BmalEffect, &[0.3, 0.7]);
    let err = orchestrator(2, 1)
        .run_experiment(&conditions, &[good_state()], &mut FailingSink)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Sink(_)));
}
