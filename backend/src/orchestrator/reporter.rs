//! Progress and result reporting hooks for the orchestrator

use super::engine::{Condition, ConditionResult};
use crate::runner::ProgressBoard;
use tracing::info;

/// Observer of a running condition, called from the polling thread
pub trait ProgressReporter: Send {
    /// Called once per poll interval while trajectories are running
    fn on_poll(&mut self, condition: &Condition, board: &ProgressBoard);

    /// Called once all trajectories of a condition have finished
    fn on_condition_complete(&mut self, _result: &ConditionResult) {}
}

/// Logs aggregate progress through `tracing`
#[derive(Debug, Default)]
pub struct TracingProgressReporter {
    /// Also log the per-cell table
    pub show_table: bool,
}

impl ProgressReporter for TracingProgressReporter {
    fn on_poll(&mut self, condition: &Condition, board: &ProgressBoard) {
        info!(
            condition = %condition.label,
            done = board.done_count(),
            cells = board.len(),
            percent = board.aggregate_percent(),
            "Progress"
        );
        if self.show_table {
            info!("\n{}", board.format_table());
        }
    }

    fn on_condition_complete(&mut self, result: &ConditionResult) {
        info!(
            condition = %result.condition.label,
            completed = result.completed_count(),
            absorbed = result.absorbed_count(),
            failed = result.failed_count(),
            "Condition finished"
        );
    }
}

/// Reporter that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_poll(&mut self, _condition: &Condition, _board: &ProgressBoard) {}
}
