//! Orchestrator - parallel experiment driver
//!
//! Fans out one trajectory per cell for each condition of a sweep, polls
//! their progress and collects every outcome.
//!
//! See `engine.rs` for full implementation.

pub mod engine;
pub mod manifest;
pub mod reporter;

// Re-export main types for convenience
pub use engine::{
    CollectingSink, Condition, ConditionResult, ExperimentConfig, ExperimentOrchestrator,
    SweepParameter, TrajectoryOutcome, TrajectorySink,
};
pub use manifest::{ConditionSummary, ExperimentManifest};
pub use reporter::{ProgressReporter, SilentReporter, TracingProgressReporter};
