//! # Pool Configuration
//!
//! Per-group and scheduler-wide tunables, supplied by the caller at
//! registration time and treated as immutable afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default instance capacity reserved per group at registration.
pub const DEFAULT_GROUP_CAPACITY: usize = 8192;

/// Default bound for each request queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Lifetime range for spawned instances, in seconds.
///
/// Each spawn samples uniformly from `[min_secs, max_secs]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifetimeRange {
    /// Minimum lifetime in seconds.
    pub min_secs: f32,
    /// Maximum lifetime in seconds.
    pub max_secs: f32,
}

impl LifetimeRange {
    /// Creates a new lifetime range.
    ///
    /// # Panics
    ///
    /// Panics if `min_secs > max_secs` or either bound is negative.
    #[must_use]
    pub fn new(min_secs: f32, max_secs: f32) -> Self {
        assert!(min_secs >= 0.0 && min_secs <= max_secs, "invalid lifetime range");
        Self { min_secs, max_secs }
    }

    /// Samples a lifetime from this range.
    #[must_use]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if (self.max_secs - self.min_secs) <= f32::EPSILON {
            return self.min_secs;
        }
        rng.gen_range(self.min_secs..=self.max_secs)
    }
}

/// Configuration for one texture group's instance pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Instance capacity reserved at registration. Capacity doubles when
    /// exhausted and never shrinks.
    #[serde(default = "default_capacity")]
    pub initial_capacity: usize,
    /// Lifetime policy for spawned instances. `None` means instances are
    /// immortal and live until explicitly despawned.
    #[serde(default)]
    pub lifetime: Option<LifetimeRange>,
}

const fn default_capacity() -> usize {
    DEFAULT_GROUP_CAPACITY
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_GROUP_CAPACITY,
            lifetime: None,
        }
    }
}

/// Configuration for the lifecycle scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Bound for each of the three request queues. A full queue drops
    /// further requests for that frame (counted, never fatal).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Seed for the scheduler's deterministic rng (lifetime sampling).
    #[serde(default)]
    pub rng_seed: u64,
}

const fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            rng_seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_lifetime_sampling_stays_in_range() {
        let range = LifetimeRange::new(1.0, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let life = range.sample(&mut rng);
            assert!((1.0..=3.0).contains(&life));
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let range = LifetimeRange::new(2.5, 2.5);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((range.sample(&mut rng) - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    #[should_panic(expected = "invalid lifetime range")]
    fn test_inverted_range_panics() {
        let _ = LifetimeRange::new(3.0, 1.0);
    }
}
