//! xorshift64* random number generator
//!
//! Fast 64-bit PRNG that passes BigCrush. Same seed → same sequence, which
//! lets a single trajectory be replayed exactly when it owns its stream.

use serde::{Deserialize, Serialize};

/// Seedable random number generator using xorshift64*
///
/// # Example
/// ```
/// use hes1_ssa_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_open_unit();
/// assert!(u > 0.0 && u <= 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift has a fixed point at zero).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create the RNG for stream `index` under `root_seed`
    ///
    /// Streams are decorrelated through [`derive_stream_seed`], so adjacent
    /// indices do not start from adjacent xorshift states.
    ///
    /// # Example
    /// ```
    /// use hes1_ssa_core::RngManager;
    ///
    /// let mut a = RngManager::for_stream(7, 0);
    /// let mut b = RngManager::for_stream(7, 1);
    /// assert_ne!(a.next(), b.next());
    /// ```
    pub fn for_stream(root_seed: u64, index: u64) -> Self {
        Self::new(derive_stream_seed(root_seed, index))
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for snapshots/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range (0.0, 1.0]
    ///
    /// The smallest value returned is 2^-53, so `-ln(u)` is always finite.
    pub fn next_open_unit(&mut self) -> f64 {
        1.0 - self.next_f64()
    }
}

/// Mix `root_seed` and `index` into an independent stream seed (SplitMix64)
pub fn derive_stream_seed(root_seed: u64, index: u64) -> u64 {
    let mut z = root_seed
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E3779B97F4A7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                (0.0..1.0).contains(&val),
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_next_open_unit_excludes_zero() {
        let mut rng = RngManager::new(99999);

        for _ in 0..1000 {
            let val = rng.next_open_unit();
            assert!(val > 0.0 && val <= 1.0, "value {} outside (0, 1]", val);
            assert!((-val.ln()).is_finite());
        }
    }

    #[test]
    fn test_stream_seeds_distinct() {
        let seeds: std::collections::HashSet<u64> =
            (0..1000).map(|i| derive_stream_seed(42, i)).collect();
        assert_eq!(seeds.len(), 1000);
    }
}
