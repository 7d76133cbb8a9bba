//! Hes1 SSA CLI.
//!
//! Runs a circadian sweep of the Hes1 / protease oscillator: for every
//! requested BMAL percentage, simulates a batch of cells from initial
//! states sampled out of a CSV pool and writes one trajectory CSV per cell.

mod io;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hes1_ssa_core::orchestrator::{
    Condition, ExperimentConfig, ExperimentOrchestrator, SweepParameter, TracingProgressReporter,
};
use hes1_ssa_core::{CellParameter, SeedPolicy};

use crate::io::{load_parameters, read_initial_states, write_manifest, CsvTrajectorySink};

#[derive(Parser)]
#[command(name = "hes1-ssa")]
#[command(about = "Stochastic simulation of the Hes1 oscillator under circadian drive")]
struct Cli {
    /// Parameter file (JSON); missing fields use the defaults
    #[arg(long)]
    params: Option<PathBuf>,

    /// Initial-state pool (CSV with header)
    #[arg(long, default_value = "initialStates.csv")]
    initial_states: PathBuf,

    /// Directory receiving one F_<condition>_<cells> folder per condition
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// BMAL effect percentages to sweep (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "30")]
    bmal_percentages: Vec<u32>,

    /// Cells per condition
    #[arg(short, long, default_value = "200")]
    cells: usize,

    /// Simulated minutes per trajectory
    #[arg(long, default_value = "4320")]
    horizon: f64,

    /// Checkpoint spacing in simulated minutes
    #[arg(long, default_value = "0.1")]
    resolution: f64,

    /// Root random seed
    #[arg(short, long, default_value = "1")]
    seed: u64,

    /// Draw every trajectory from one locked generator (not reproducible)
    #[arg(long)]
    shared_rng: bool,

    /// Progress polling interval in milliseconds
    #[arg(long, default_value = "500")]
    poll_ms: u64,

    /// Worker threads (default: one per cell)
    #[arg(long)]
    workers: Option<usize>,

    /// Log the per-cell progress table on every poll
    #[arg(long)]
    show_table: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn experiment_config(&self) -> ExperimentConfig {
        let seed_policy = if self.shared_rng {
            SeedPolicy::Shared { seed: self.seed }
        } else {
            SeedPolicy::PerTrajectory {
                root_seed: self.seed,
            }
        };

        ExperimentConfig {
            cell_count: self.cells,
            horizon: self.horizon,
            resolution: self.resolution,
            seed_policy,
            poll_interval_ms: self.poll_ms,
            worker_threads: self.workers,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.bmal_percentages.is_empty() {
        bail!("At least one BMAL percentage is required");
    }

    let base = match &cli.params {
        Some(path) => load_parameters(path)?,
        None => CellParameter::default(),
    };
    let pool = read_initial_states(&cli.initial_states)?;

    let values: Vec<f64> = cli
        .bmal_percentages
        .iter()
        .map(|&pct| f64::from(pct) / 100.0)
        .collect();
    let conditions = Condition::sweep(&base, SweepParameter::BmalEffect, &values);

    let config = cli.experiment_config();
    let mut orchestrator = ExperimentOrchestrator::new(config)
        .context("Invalid experiment configuration")?
        .with_reporter(TracingProgressReporter {
            show_table: cli.show_table,
        });

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;
    let mut sink = CsvTrajectorySink::new(&cli.output_dir, cli.cells);

    let started_at = chrono::Utc::now();
    let mut manifest = orchestrator
        .run_experiment(&conditions, &pool, &mut sink)
        .context("Experiment failed")?;
    manifest.started_at = Some(started_at.to_rfc3339());

    let manifest_path = cli
        .output_dir
        .join(format!("manifest_{}.json", started_at.format("%Y%m%dT%H%M%S")));
    write_manifest(&manifest_path, &manifest)?;

    println!("\n=== Experiment Complete ===");
    println!("Run: {}", manifest.run_id);
    for summary in &manifest.conditions {
        println!(
            "{:<12} completed {:>4}  absorbed {:>4}  failed {:>4}  mean steps {:>12.0}  {:.1}s",
            summary.label,
            summary.completed,
            summary.absorbed,
            summary.failed,
            summary.mean_steps,
            summary.wall_seconds
        );
    }

    let failures = manifest.total_failures();
    if failures > 0 {
        warn!(failures = failures, "Some trajectories failed; see manifest");
    }
    info!(elapsed = %(chrono::Utc::now() - started_at), "Done");

    Ok(())
}
