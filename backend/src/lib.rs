//! Hes1 Oscillator SSA - Rust Engine
//!
//! Exact stochastic simulation (Gillespie direct method) of the Hes1 /
//! protease feedback network under a circadian drive, with a parallel
//! driver that runs many independent cells per experiment condition.
//!
//! # Architecture
//!
//! - **core**: Errors, checkpoint timing, circadian drive
//! - **models**: Domain types (CellState, CellParameter, Reaction, Trajectory)
//! - **network**: SSA engine for one cell (propensities, step, snapshots)
//! - **runner**: Drives one network to a horizon, sampling checkpoints
//! - **orchestrator**: Parallel multi-trajectory experiment driver
//! - **rng**: Seedable random number generation
//!
//! # Critical Invariants
//!
//! 1. All counts are ≥ 0 at every observable point (violations are errors)
//! 2. Simulated time never decreases
//! 3. The propensity vector is recomputed in full after every change
//! 4. One failing trajectory never aborts its siblings

// Module declarations
pub mod core;
pub mod models;
pub mod network;
pub mod orchestrator;
pub mod rng;
pub mod runner;

// Re-exports for convenience
pub use crate::core::error::SimulationError;
pub use crate::core::time::{CheckpointClock, ElapsedTime};
pub use models::{
    CellParameter, CellState, Checkpoint, FireCounts, Reaction, Species, Termination, Trajectory,
};
pub use network::{NetworkSnapshot, PropensityVector, ReactionNetwork};
pub use orchestrator::{
    Condition, ConditionResult, ExperimentConfig, ExperimentManifest, ExperimentOrchestrator,
    SweepParameter, TrajectoryOutcome, TrajectorySink,
};
pub use rng::{RandomSource, RngManager, SeedPolicy, SharedRng};
pub use runner::{NoProgress, ProgressBoard, ProgressCell, ProgressSink, RunWindow, TrajectoryRunner};
