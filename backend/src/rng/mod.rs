//! Random number generation for the SSA
//!
//! Uses xorshift64* for fast, seedable draws. Every random number the
//! simulator consumes goes through a [`RandomSource`]: either a private
//! [`RngManager`] owned by one trajectory, or a [`SharedRng`] handle that
//! serializes draws from a single generator across workers.

mod source;
mod xorshift;

pub use source::{RandomSource, SeedPolicy, SharedRng};
pub use xorshift::{derive_stream_seed, RngManager};
