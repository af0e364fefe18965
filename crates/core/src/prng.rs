//! Deterministic randomness for spawning particles and seeding fields.
//!
//! The simulation never calls a global RNG. It draws from a [`RandomSource`]
//! handed in by the host; [`Xorshift64`] is the default implementation and
//! gives bit-identical runs for identical seeds on every platform.

use serde::{Deserialize, Serialize};

/// A stream of uniformly distributed numbers consumed by the simulation.
pub trait RandomSource {
    /// Uniform f64 in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Uniform f64 in [min, max). Inverted bounds are allowed and sample
    /// (max, min].
    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform index in [0, len). Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.next_f64() > 0.5
    }
}

/// Xorshift64 PRNG with shifts (13, 7, 17).
///
/// Seed 0 is replaced by a non-zero fallback to avoid the all-zeros fixed
/// point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

impl RandomSource for Xorshift64 {
    /// Upper 53 bits of `next_u64()` divided by 2^53.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_u64_produces_known_golden_value_for_seed_42() {
        // Pinned: changing the generator invalidates recorded RunSpecs.
        let mut rng = Xorshift64::new(42);
        assert_eq!(rng.next_u64(), 45_454_805_674);
    }

    #[test]
    fn seed_zero_does_not_produce_all_zeros() {
        let mut rng = Xorshift64::new(0);
        for _ in 0..3 {
            assert_ne!(rng.next_u64(), 0);
        }
    }

    #[test]
    fn two_instances_with_same_seed_produce_identical_sequences() {
        let mut a = Xorshift64::new(7);
        let mut b = Xorshift64::new(7);
        for i in 0..1000 {
            assert_eq!(a.next_f64(), b.next_f64(), "diverged at index {i}");
        }
    }

    #[test]
    fn inverted_range_samples_between_bounds() {
        // Negative direction signs are drawn as range(-0.1, -1.0).
        let mut rng = Xorshift64::new(99);
        for _ in 0..1000 {
            let v = rng.range(-0.1, -1.0);
            assert!(v <= -0.1 && v > -1.0, "out of bounds: {v}");
        }
    }

    #[test]
    fn index_of_empty_is_zero() {
        let mut rng = Xorshift64::new(3);
        assert_eq!(rng.index(0), 0);
    }

    #[test]
    fn coin_produces_both_outcomes() {
        let mut rng = Xorshift64::new(11);
        let heads = (0..1000).filter(|_| rng.coin()).count();
        assert!(heads > 300 && heads < 700, "heads = {heads}");
    }

    #[test]
    fn serialization_roundtrip_preserves_state() {
        let mut rng = Xorshift64::new(42);
        for _ in 0..50 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Xorshift64 = serde_json::from_str(&json).unwrap();
        for i in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64(), "diverged at {i}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn next_f64_in_unit_interval_for_any_seed(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v), "next_f64() = {v}");
                }
            }

            #[test]
            fn range_in_bounds_for_any_seed(
                seed: u64,
                min in -1e6_f64..1e6,
                max in -1e6_f64..1e6,
            ) {
                prop_assume!(min < max);
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    let v = rng.range(min, max);
                    prop_assert!(v >= min && v < max, "range({min}, {max}) = {v}");
                }
            }

            #[test]
            fn index_in_bounds_for_any_seed(seed: u64, len in 1_usize..10_000) {
                let mut rng = Xorshift64::new(seed);
                for _ in 0..100 {
                    prop_assert!(rng.index(len) < len);
                }
            }
        }
    }
}
