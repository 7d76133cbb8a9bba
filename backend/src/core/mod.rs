//! Core building blocks: errors, checkpoint timing, circadian drive

pub mod circadian;
pub mod error;
pub mod time;
