//! Experiment Orchestrator Engine
//!
//! Runs many independent trajectories per parameter condition and walks a
//! sweep of conditions one after another:
//!
//! ```text
//! For each condition c (strictly sequential):
//! 1. Reset the progress board
//! 2. Sample cell_count initial states from the pool (with replacement)
//! 3. Fan out one trajectory per cell on the worker pool
//! 4. Poll completion flags every poll interval, reporting progress
//! 5. Join the pool and collect every outcome (failures included)
//! 6. Hand the condition result to the trajectory sink
//! ```
//!
//! A failing trajectory never takes its siblings down: its error is kept
//! in its [`TrajectoryOutcome`] and the condition carries on.
//!
//! # Example
//!
//! ```rust
//! use hes1_ssa_core::orchestrator::{Condition, ExperimentConfig, ExperimentOrchestrator, SweepParameter};
//! use hes1_ssa_core::{CellParameter, CellState, SeedPolicy};
//!
//! let config = ExperimentConfig {
//!     cell_count: 4,
//!     horizon: 0.5,
//!     resolution: 0.1,
//!     seed_policy: SeedPolicy::PerTrajectory { root_seed: 9 },
//!     poll_interval_ms: 5,
//!     worker_threads: Some(2),
//! };
//! let conditions = Condition::sweep(&CellParameter::default(), SweepParameter::BmalEffect, &[0.3]);
//! let pool = vec![CellState::from_counts([0, 0, 0, 15, 12, 0])];
//!
//! let mut orchestrator = ExperimentOrchestrator::new(config).unwrap();
//! let results = orchestrator.collect_experiment(&conditions, &pool).unwrap();
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].outcomes.len(), 4);
//! assert_eq!(results[0].condition.label, "bmal30");
//! ```

use super::manifest::ExperimentManifest;
use super::reporter::{ProgressReporter, TracingProgressReporter};
use crate::core::error::SimulationError;
use crate::models::parameter::CellParameter;
use crate::models::state::CellState;
use crate::models::trajectory::{Termination, Trajectory};
use crate::rng::{derive_stream_seed, RandomSource, RngManager, SeedPolicy, SharedRng};
use crate::runner::{ProgressBoard, RunWindow, TrajectoryRunner};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Stream index reserved for initial-state sampling
const SAMPLER_STREAM: u64 = u64::MAX;

// ============================================================================
// Configuration Types
// ============================================================================

/// Experiment-wide settings shared by every condition
///
/// # Fields
///
/// * `cell_count` - Trajectories per condition
/// * `horizon` - Simulated minutes per trajectory
/// * `resolution` - Checkpoint spacing in simulated minutes
/// * `seed_policy` - How random streams are seeded
/// * `poll_interval_ms` - Wall-clock progress polling interval
/// * `worker_threads` - Worker pool size (None = one per cell)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub cell_count: usize,
    pub horizon: f64,
    pub resolution: f64,
    pub seed_policy: SeedPolicy,
    pub poll_interval_ms: u64,
    pub worker_threads: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            cell_count: 200,
            horizon: 60.0 * 24.0 * 3.0,
            resolution: 0.1,
            seed_policy: SeedPolicy::default(),
            poll_interval_ms: 500,
            worker_threads: None,
        }
    }
}

impl ExperimentConfig {
    pub fn window(&self) -> RunWindow {
        RunWindow::new(self.horizon, self.resolution)
    }

    /// Effective worker pool size
    pub fn workers(&self) -> usize {
        self.worker_threads.unwrap_or(self.cell_count).max(1)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.cell_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "cell_count must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(SimulationError::InvalidConfig(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(SimulationError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        self.window().validate()
    }
}

/// Coefficient varied across the conditions of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    /// Circadian amplitude; labelled as a percentage (`bmal30` for 0.3)
    BmalEffect,
    /// Circadian phase offset in minutes
    CycleOffset,
}

impl SweepParameter {
    /// Variant of `base` with this coefficient set to `value`
    pub fn apply(self, base: &CellParameter, value: f64) -> CellParameter {
        match self {
            SweepParameter::BmalEffect => base.with_bmal_effect(value),
            SweepParameter::CycleOffset => base.with_cycle_offset(value),
        }
    }

    pub fn label(self, value: f64) -> String {
        match self {
            SweepParameter::BmalEffect => format!("bmal{}", (value * 100.0).round() as i64),
            SweepParameter::CycleOffset => format!("offset{}", value),
        }
    }
}

/// One experiment condition: a named parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub label: String,
    pub parameter: CellParameter,
}

impl Condition {
    pub fn new(label: impl Into<String>, parameter: CellParameter) -> Self {
        Self {
            label: label.into(),
            parameter,
        }
    }

    /// One condition per value, each a fresh variant of `base`
    pub fn sweep(base: &CellParameter, parameter: SweepParameter, values: &[f64]) -> Vec<Condition> {
        values
            .iter()
            .map(|&value| Condition::new(parameter.label(value), parameter.apply(base, value)))
            .collect()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of one trajectory: completed run or typed failure
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryOutcome {
    /// Zero-based cell index within the condition
    pub cell: usize,
    pub initial_state: CellState,
    pub result: Result<Trajectory, SimulationError>,
}

impl TrajectoryOutcome {
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SimulationError> {
        self.result.as_ref().err()
    }
}

/// Every outcome of one condition, in cell order
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionResult {
    pub condition: Condition,
    pub outcomes: Vec<TrajectoryOutcome>,
    pub wall_seconds: f64,
}

impl ConditionResult {
    /// Successful trajectories with their cell index
    pub fn trajectories(&self) -> impl Iterator<Item = (usize, &Trajectory)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.trajectory().map(|t| (o.cell, t)))
    }

    /// Failed trajectories with their cell index
    pub fn failures(&self) -> impl Iterator<Item = (usize, &SimulationError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.cell, e)))
    }

    /// Trajectories that ran to the horizon
    pub fn completed_count(&self) -> usize {
        self.trajectories()
            .filter(|(_, t)| t.termination() == Termination::HorizonReached)
            .count()
    }

    /// Trajectories that stopped in an absorbing state
    pub fn absorbed_count(&self) -> usize {
        self.trajectories()
            .filter(|(_, t)| matches!(t.termination(), Termination::Absorbed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

/// Consumer of finished conditions (persistence collaborator)
pub trait TrajectorySink {
    fn persist(&mut self, result: ConditionResult) -> Result<(), SimulationError>;
}

/// Sink that keeps every condition result in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub results: Vec<ConditionResult>,
}

impl TrajectorySink for CollectingSink {
    fn persist(&mut self, result: ConditionResult) -> Result<(), SimulationError> {
        self.results.push(result);
        Ok(())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Random streams owned by the orchestrator
enum RandomStreams {
    /// Sampler stream plus per-trajectory streams derived on demand
    PerTrajectory { root_seed: u64, sampler: RngManager },
    /// One locked generator for sampling and every trajectory
    Shared(SharedRng),
}

/// Runs experiment conditions as parallel batches of trajectories
pub struct ExperimentOrchestrator {
    config: ExperimentConfig,
    streams: RandomStreams,
    board: ProgressBoard,
    reporter: Box<dyn ProgressReporter>,
    /// Conditions started so far; seeds each condition's streams
    conditions_run: u64,
}

impl ExperimentOrchestrator {
    /// Create a new orchestrator from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ExperimentOrchestrator)` - Ready to run conditions
    /// * `Err(SimulationError::InvalidConfig)` - Configuration validation failed
    pub fn new(config: ExperimentConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let streams = match config.seed_policy {
            SeedPolicy::PerTrajectory { root_seed } => RandomStreams::PerTrajectory {
                root_seed,
                sampler: RngManager::for_stream(root_seed, SAMPLER_STREAM),
            },
            SeedPolicy::Shared { seed } => RandomStreams::Shared(SharedRng::new(seed)),
        };

        Ok(Self {
            board: ProgressBoard::new(config.cell_count),
            config,
            streams,
            reporter: Box::new(TracingProgressReporter::default()),
            conditions_run: 0,
        })
    }

    /// Replace the progress reporter
    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Progress board of the current (or last) condition
    pub fn board(&self) -> &ProgressBoard {
        &self.board
    }

    /// Draw `cell_count` initial states uniformly, with replacement
    pub fn sample_initial_states(
        &mut self,
        pool: &[CellState],
    ) -> Result<Vec<CellState>, SimulationError> {
        if pool.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "initial state pool is empty".to_string(),
            ));
        }

        let sampler: &mut dyn RandomSource = match &mut self.streams {
            RandomStreams::PerTrajectory { sampler, .. } => sampler,
            RandomStreams::Shared(shared) => shared,
        };

        Ok((0..self.config.cell_count)
            .map(|_| pool[uniform_index(sampler.uniform_open_unit(), pool.len())].at_origin())
            .collect())
    }

    /// Run every trajectory of one condition to completion
    ///
    /// Only configuration problems (invalid parameters, empty pool, worker
    /// pool construction) fail the whole condition. Per-trajectory errors,
    /// panics included, land in the matching [`TrajectoryOutcome`].
    pub fn run_condition(
        &mut self,
        condition: &Condition,
        pool: &[CellState],
    ) -> Result<ConditionResult, SimulationError> {
        let runner = TrajectoryRunner::new(condition.parameter.clone(), self.config.window())?;
        let initial_states = self.sample_initial_states(pool)?;

        let condition_seed = match &self.streams {
            RandomStreams::PerTrajectory { root_seed, .. } => {
                derive_stream_seed(*root_seed, self.conditions_run)
            }
            RandomStreams::Shared(_) => 0,
        };
        let shared = match &self.streams {
            RandomStreams::Shared(rng) => Some(rng.clone()),
            RandomStreams::PerTrajectory { .. } => None,
        };
        self.conditions_run += 1;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers())
            .thread_name(|i| format!("ssa-worker-{}", i))
            .build()
            .map_err(|e| SimulationError::WorkerPool(e.to_string()))?;

        info!(
            condition = %condition.label,
            cells = initial_states.len(),
            workers = self.config.workers(),
            "Starting condition"
        );

        self.board.reset();
        let board = &self.board;
        let reporter = &mut self.reporter;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let started = Instant::now();

        let outcomes = std::thread::scope(|scope| {
            let workers = scope.spawn(|| {
                thread_pool.install(|| {
                    initial_states
                        .par_iter()
                        .enumerate()
                        .map(|(cell, &initial_state)| {
                            let progress = board.cell(cell);
                            let result = run_isolated(|| match &shared {
                                Some(rng) => runner.run(initial_state, &mut rng.clone(), progress),
                                None => {
                                    let mut rng = RngManager::for_stream(condition_seed, cell as u64);
                                    runner.run(initial_state, &mut rng, progress)
                                }
                            });
                            progress.mark_done();

                            if let Err(e) = &result {
                                warn!(cell = cell, error = %e, "Trajectory failed");
                            }
                            TrajectoryOutcome {
                                cell,
                                initial_state,
                                result,
                            }
                        })
                        .collect::<Vec<_>>()
                })
            });

            loop {
                reporter.on_poll(condition, board);
                if board.all_done() || workers.is_finished() {
                    break;
                }
                std::thread::sleep(poll_interval);
            }

            workers.join().map_err(|payload| {
                SimulationError::WorkerPool(format!(
                    "worker pool panicked: {}",
                    panic_message(payload.as_ref())
                ))
            })
        })?;

        Ok(ConditionResult {
            condition: condition.clone(),
            outcomes,
            wall_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Run every condition in order, handing each result to `sink`
    ///
    /// Returns the manifest of the run.
    pub fn run_experiment(
        &mut self,
        conditions: &[Condition],
        pool: &[CellState],
        sink: &mut dyn TrajectorySink,
    ) -> Result<ExperimentManifest, SimulationError> {
        let mut manifest = ExperimentManifest::new(self.config.clone());

        info!(
            run_id = %manifest.run_id,
            conditions = conditions.len(),
            cells = self.config.cell_count,
            horizon = self.config.horizon,
            reproducible = self.config.seed_policy.is_reproducible(),
            "Starting experiment"
        );

        for condition in conditions {
            let result = self.run_condition(condition, pool)?;
            self.reporter.on_condition_complete(&result);
            manifest.record(&result)?;
            sink.persist(result)?;
        }

        info!(
            run_id = %manifest.run_id,
            failures = manifest.total_failures(),
            "Experiment finished"
        );
        Ok(manifest)
    }

    /// Run every condition and keep all results in memory
    pub fn collect_experiment(
        &mut self,
        conditions: &[Condition],
        pool: &[CellState],
    ) -> Result<Vec<ConditionResult>, SimulationError> {
        let mut sink = CollectingSink::default();
        self.run_experiment(conditions, pool, &mut sink)?;
        Ok(sink.results)
    }
}

impl std::fmt::Debug for ExperimentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentOrchestrator")
            .field("config", &self.config)
            .field("conditions_run", &self.conditions_run)
            .finish()
    }
}

/// Map a draw on (0, 1] to an index in [0, len)
fn uniform_index(u: f64, len: usize) -> usize {
    ((u * len as f64).ceil() as usize).clamp(1, len) - 1
}

/// Run one trajectory, turning a panic into a per-trajectory error
fn run_isolated<F>(f: F) -> Result<Trajectory, SimulationError>
where
    F: FnOnce() -> Result<Trajectory, SimulationError>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(SimulationError::WorkerPool(format!(
            "trajectory panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
