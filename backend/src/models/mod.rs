//! Domain models for the Hes1 oscillator

pub mod parameter;
pub mod reaction;
pub mod state;
pub mod trajectory;

// Re-exports
pub use parameter::CellParameter;
pub use reaction::Reaction;
pub use state::{CellState, Species};
pub use trajectory::{Checkpoint, FireCounts, Termination, Trajectory};
