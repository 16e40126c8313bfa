//! Random draws used by the job lifecycle.
//!
//! [`RandomSource`] hides where randomness comes from so tests can force
//! the completion delay and the transient error outcome.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the two random draws the registry makes.
pub trait RandomSource: Send + Sync {
    /// Uniform draw from the closed range `[min, max]`.
    fn completion_delay(&self, min: Duration, max: Duration) -> Duration;

    /// Bernoulli draw that returns `true` with the given probability.
    fn transient_error(&self, probability: f64) -> bool;
}

fn sample_delay(rng: &mut impl Rng, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let secs = rng.random_range(min.as_secs_f64()..=max.as_secs_f64());
    Duration::from_secs_f64(secs).clamp(min, max)
}

fn sample_error(rng: &mut impl Rng, probability: f64) -> bool {
    rng.random_bool(probability.clamp(0.0, 1.0))
}

/// Per-thread RNG. Draws from different request handlers never share a lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn completion_delay(&self, min: Duration, max: Duration) -> Duration {
        sample_delay(&mut rand::rng(), min, max)
    }

    fn transient_error(&self, probability: f64) -> bool {
        sample_error(&mut rand::rng(), probability)
    }
}

/// Deterministic RNG seeded from a `u64`. Two instances with the same seed
/// produce the same sequence of draws.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn completion_delay(&self, min: Duration, max: Duration) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        sample_delay(&mut *rng, min, max)
    }

    fn transient_error(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        sample_error(&mut *rng, probability)
    }
}
