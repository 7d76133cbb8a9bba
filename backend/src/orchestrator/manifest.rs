//! Experiment manifest
//!
//! Serializable record of one experiment run: configuration, per-condition
//! parameter hashes and outcome tallies. Trajectory data itself is handed
//! to the [`TrajectorySink`](super::TrajectorySink) and is not part of it.

use super::engine::{ConditionResult, ExperimentConfig};
use crate::core::error::SimulationError;
use crate::network::compute_config_hash;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentManifest {
    pub run_id: Uuid,

    /// Wall-clock start, filled in by the caller (RFC 3339)
    pub started_at: Option<String>,

    pub config: ExperimentConfig,

    pub conditions: Vec<ConditionSummary>,
}

/// Tally of one condition's trajectories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub label: String,
    pub parameter_hash: String,
    pub completed: usize,
    pub absorbed: usize,
    pub failed: usize,
    /// `(cell index, error message)` for each failed trajectory
    pub failures: Vec<(usize, String)>,
    /// Mean SSA steps over successful trajectories
    pub mean_steps: f64,
    pub wall_seconds: f64,
}

impl ExperimentManifest {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: None,
            config,
            conditions: Vec::new(),
        }
    }

    /// Append the summary of a finished condition
    pub fn record(&mut self, result: &ConditionResult) -> Result<(), SimulationError> {
        let successes: Vec<_> = result.trajectories().collect();
        let mean_steps = if successes.is_empty() {
            0.0
        } else {
            successes.iter().map(|(_, t)| t.steps() as f64).sum::<f64>() / successes.len() as f64
        };

        self.conditions.push(ConditionSummary {
            label: result.condition.label.clone(),
            parameter_hash: compute_config_hash(&result.condition.parameter)?,
            completed: result.completed_count(),
            absorbed: result.absorbed_count(),
            failed: result.failed_count(),
            failures: result
                .failures()
                .map(|(cell, e)| (cell, e.to_string()))
                .collect(),
            mean_steps,
            wall_seconds: result.wall_seconds,
        });
        Ok(())
    }

    pub fn total_failures(&self) -> usize {
        self.conditions.iter().map(|c| c.failed).sum()
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::Serialization(format!("Manifest serialization failed: {}", e)))
    }
}

impl ConditionSummary {
    pub fn total(&self) -> usize {
        self.completed + self.absorbed + self.failed
    }
}

