//! Progress signalling between trajectory workers and the poller
//!
//! Each worker owns one [`ProgressCell`]: a fraction in [0, 1] and a
//! completion flag, both lock-free so the polling thread never blocks a
//! worker.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Receiver of fractional progress updates
pub trait ProgressSink: Sync {
    fn report(&self, fraction: f64);
}

/// Sink that discards updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Per-trajectory progress fraction and completion flag
#[derive(Debug, Default)]
pub struct ProgressCell {
    /// f64 bit pattern of the fraction
    fraction: AtomicU64,
    done: AtomicBool,
}

impl ProgressCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.fraction.load(Ordering::Relaxed))
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        self.fraction.store(0f64.to_bits(), Ordering::Relaxed);
        self.done.store(false, Ordering::Release);
    }
}

impl ProgressSink for ProgressCell {
    fn report(&self, fraction: f64) {
        self.fraction
            .store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

/// Progress cells of every trajectory in one experiment condition
#[derive(Debug)]
pub struct ProgressBoard {
    cells: Vec<ProgressCell>,
}

impl ProgressBoard {
    pub fn new(cell_count: usize) -> Self {
        Self {
            cells: (0..cell_count).map(|_| ProgressCell::new()).collect(),
        }
    }

    pub fn cell(&self, index: usize) -> &ProgressCell {
        &self.cells[index]
    }

    pub fn cells(&self) -> &[ProgressCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn all_done(&self) -> bool {
        self.cells.iter().all(ProgressCell::is_done)
    }

    pub fn done_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_done()).count()
    }

    /// Mean progress in percent; finished cells count as 100
    pub fn aggregate_percent(&self) -> f64 {
        if self.cells.is_empty() {
            return 100.0;
        }
        let sum: f64 = self
            .cells
            .iter()
            .map(|c| if c.is_done() { 1.0 } else { c.fraction() })
            .sum();
        100.0 * sum / self.cells.len() as f64
    }

    /// Zero every fraction and clear every flag
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.reset();
        }
    }

    /// Per-cell table, five cells per line
    pub fn format_table(&self) -> String {
        let mut out = String::new();
        for (i, cell) in self.cells.iter().enumerate() {
            out.push_str(&format!("Cell {:>3}: {:>5.1}%\t", i + 1, cell.fraction() * 100.0));
            if i % 5 == 4 {
                out.push('\n');
            }
        }
        out
    }
}
