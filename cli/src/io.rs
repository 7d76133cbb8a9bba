//! File input and output for experiment runs
//!
//! - Initial-state pool: CSV with a header row and the columns
//!   `time, protein, mRNA, protease, free Hes1 promoter, free protease
//!   promoter, dimer`. The time column is read but discarded.
//! - Trajectories: one CSV per successful cell under
//!   `<output>/F_<condition label>_<cells>/simulation_results_cell_<n>.csv`
//!   (1-based `n`), plus a per-condition `reaction_fire_counts.csv`.
//! - Parameter files and the run manifest are JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Writer};
use tracing::{debug, info};

use hes1_ssa_core::orchestrator::{ConditionResult, ExperimentManifest, TrajectorySink};
use hes1_ssa_core::{CellParameter, CellState, Reaction, SimulationError, Species, Termination, Trajectory};

/// Header of every trajectory CSV
pub fn trajectory_header() -> Vec<&'static str> {
    std::iter::once("Time")
        .chain(Species::ALL.iter().map(|s| s.column_name()))
        .collect()
}

/// Load the initial-state pool
pub fn read_initial_states(path: &Path) -> Result<Vec<CellState>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open initial states {}", path.display()))?;

    let mut states = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Malformed row {} in {}", line + 2, path.display()))?;
        if record.len() < 1 + Species::COUNT {
            bail!(
                "Row {} in {} has {} columns, expected {}",
                line + 2,
                path.display(),
                record.len(),
                1 + Species::COUNT
            );
        }

        let _time: f64 = record[0]
            .parse()
            .with_context(|| format!("Invalid time '{}' in row {}", &record[0], line + 2))?;

        let mut counts = [0i64; Species::COUNT];
        for (i, species) in Species::ALL.iter().enumerate() {
            let field = &record[i + 1];
            counts[i] = field
                .parse()
                .with_context(|| format!("Invalid {} '{}' in row {}", species, field, line + 2))?;
        }
        states.push(CellState::from_counts(counts));
    }

    if states.is_empty() {
        bail!("No initial states found in {}", path.display());
    }
    info!(path = %path.display(), states = states.len(), "Loaded initial-state pool");
    Ok(states)
}

/// Load a parameter set; missing fields take their default values
pub fn load_parameters(path: &Path) -> Result<CellParameter> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters {}", path.display()))?;
    let parameter: CellParameter = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse parameters {}", path.display()))?;
    parameter
        .validate()
        .with_context(|| format!("Invalid parameters in {}", path.display()))?;
    Ok(parameter)
}

/// Write one trajectory as CSV
pub fn write_trajectory_csv(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(trajectory_header())?;
    for (time, counts) in trajectory.rows() {
        let mut row = Vec::with_capacity(1 + Species::COUNT);
        row.push(time.to_string());
        row.extend(counts.iter().map(|c| c.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the run manifest as pretty JSON
pub fn write_manifest(path: &Path, manifest: &ExperimentManifest) -> Result<()> {
    let json = manifest.to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write manifest {}", path.display()))?;
    info!(path = %path.display(), "Wrote manifest");
    Ok(())
}

fn termination_label(termination: Termination) -> String {
    match termination {
        Termination::HorizonReached => "horizon".to_string(),
        Termination::Absorbed { time } => format!("absorbed@{}", time),
    }
}

/// Sink writing each condition's trajectories under an output root
#[derive(Debug, Clone)]
pub struct CsvTrajectorySink {
    root: PathBuf,
    cell_count: usize,
}

impl CsvTrajectorySink {
    pub fn new(root: impl Into<PathBuf>, cell_count: usize) -> Self {
        Self {
            root: root.into(),
            cell_count,
        }
    }

    /// Directory holding one condition's files
    pub fn condition_dir(&self, label: &str) -> PathBuf {
        self.root.join(format!("F_{}_{}", label, self.cell_count))
    }

    fn write_condition(&self, result: &ConditionResult) -> Result<PathBuf> {
        let dir = self.condition_dir(&result.condition.label);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        for (cell, trajectory) in result.trajectories() {
            let path = dir.join(format!("simulation_results_cell_{}.csv", cell + 1));
            write_trajectory_csv(&path, trajectory)?;
            debug!(cell = cell + 1, rows = trajectory.len(), "Wrote trajectory");
        }

        let path = dir.join("reaction_fire_counts.csv");
        let mut writer =
            Writer::from_path(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut header = vec!["cell", "steps", "termination"];
        header.extend(Reaction::ALL.iter().map(|r| r.label()));
        writer.write_record(&header)?;
        for (cell, trajectory) in result.trajectories() {
            let mut row = vec![
                (cell + 1).to_string(),
                trajectory.steps().to_string(),
                termination_label(trajectory.termination()),
            ];
            row.extend(trajectory.fire_counts().iter().map(|(_, n)| n.to_string()));
            writer.write_record(&row)?;
        }
        writer.flush()?;

        Ok(dir)
    }
}

impl TrajectorySink for CsvTrajectorySink {
    fn persist(&mut self, result: ConditionResult) -> Result<(), SimulationError> {
        let dir = self
            .write_condition(&result)
            .map_err(|e| SimulationError::Sink(format!("{:#}", e)))?;
        info!(
            condition = %result.condition.label,
            written = result.trajectories().count(),
            failed = result.failed_count(),
            dir = %dir.display(),
            "Condition persisted"
        );
        Ok(())
    }
}
