//! Uniform random draws for inverse-CDF sampling.
//!
//! The engine needs exactly one capability from the host's random number
//! generator: a uniform draw from the unit interval. [`UniformSource`]
//! names that capability and is implemented for every [`rand::Rng`], so
//! the application keeps ownership (and seeding) of its generator.
//!
//! # Reproducibility
//!
//! For reproducible experiments, use [`create_rng`] with a fixed seed.
//! The underlying algorithm (SmallRng) is deterministic for a given seed
//! on the same platform.

use rand::Rng;

/// Source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Draws one value uniformly from `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<R: Rng> UniformSource for R {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Creates a fast, seeded random number generator.
///
/// Uses `SmallRng` (Xoshiro256++). The sequence is deterministic for a
/// given seed on the same platform.
///
/// # Examples
/// ```
/// use u_empirical::random::{create_rng, UniformSource};
/// let mut rng = create_rng(42);
/// let x = rng.next_unit();
/// assert!((0.0..1.0).contains(&x));
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Fixed sequence of draws, replayed cyclically.
///
/// Lets tests pin the uniform value fed to inverse-CDF sampling.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    values: Vec<f64>,
    next: usize,
}

impl ReplaySource {
    /// Creates a source replaying `values` in order, wrapping around.
    ///
    /// Values are clamped into `[0, 1]`; an empty list replays `0.0`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Self { values, next: 0 }
    }
}

impl UniformSource for ReplaySource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next = (self.next + 1) % self.values.len();
        v
    }
}
