//! Distributions estimated from weighted observations.
//!
//! [`WeightedSamples`] collects values with non-negative weights and turns
//! them into a [`DiscretizedDistribution`]: each value's weight is shared
//! linearly between its two neighbouring grid points, which keeps the
//! total weight and the weighted mean of the samples exactly.
//!
//! # Examples
//! ```
//! use u_empirical::sampled::WeightedSamples;
//! let mut s = WeightedSamples::new();
//! s.add_sample(1.0, 1.0);
//! s.add_sample(2.0, 1.0);
//! s.add_sample(4.0, 2.0);
//! let d = s.to_distribution(Default::default()).unwrap();
//! assert!((d.mean() - 2.75).abs() < 1e-9);
//! assert_eq!(d.lower_bound(), 1.0);
//! assert_eq!(d.upper_bound(), 4.0);
//! ```

use crate::config::DistributionConfig;
use crate::distribution::DiscretizedDistribution;
use crate::error::{DistributionError, Result};
use crate::stats;

/// Observed values and their weights, in insertion order.
///
/// A value added twice keeps one entry whose weight accumulates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedSamples {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl WeightedSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects `values` with `weights`; empty `weights` weighs every
    /// value 1.
    ///
    /// # Errors
    /// Returns [`DistributionError::Domain`] if `weights` is non-empty and
    /// its length differs from `values`.
    pub fn from_samples(values: &[f64], weights: &[f64]) -> Result<Self> {
        let mut s = Self::new();
        s.define_samples(values, weights)?;
        Ok(s)
    }

    /// Replaces every sample; see [`from_samples`](Self::from_samples).
    ///
    /// # Errors
    /// Returns [`DistributionError::Domain`] on a length mismatch, leaving
    /// the current samples in place.
    pub fn define_samples(&mut self, values: &[f64], weights: &[f64]) -> Result<()> {
        if !weights.is_empty() && weights.len() != values.len() {
            return Err(DistributionError::Domain(format!(
                "{} samples but {} weights",
                values.len(),
                weights.len()
            )));
        }
        self.clear();
        if weights.is_empty() {
            for &v in values {
                self.add_sample(v, 1.0);
            }
        } else {
            for (&v, &w) in values.iter().zip(weights) {
                self.add_sample(v, w);
            }
        }
        Ok(())
    }

    /// Adds one observation.
    ///
    /// Negative weights count as 0. A non-finite value or weight is ignored.
    pub fn add_sample(&mut self, value: f64, weight: f64) {
        if !value.is_finite() || !weight.is_finite() {
            tracing::warn!(value, weight, "ignoring non-finite sample");
            return;
        }
        let weight = weight.max(0.0);
        match self.values.iter().position(|&v| v == value) {
            Some(i) => self.weights[i] += weight,
            None => {
                self.values.push(value);
                self.weights.push(weight);
            }
        }
    }

    /// Removes the sample at `idx`, returning its value and weight.
    pub fn remove_sample(&mut self, idx: usize) -> Option<(f64, f64)> {
        if idx >= self.values.len() {
            return None;
        }
        Some((self.values.remove(idx), self.weights.remove(idx)))
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.weights.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total_weight(&self) -> f64 {
        stats::kahan_sum(&self.weights)
    }

    /// Weighted mean, or `None` when no sample carries weight.
    pub fn mean(&self) -> Option<f64> {
        let total = self.total_weight();
        if total <= 0.0 {
            return None;
        }
        let weighted: Vec<f64> = self
            .values
            .iter()
            .zip(&self.weights)
            .map(|(v, w)| v * w)
            .collect();
        Some(stats::kahan_sum(&weighted) / total)
    }

    /// Unbiased weighted variance, treating weights as reliabilities:
    /// `Σ wᵢ(xᵢ − m)² / (W − Σ wᵢ² / W)`.
    ///
    /// `None` when no sample carries weight; 0 when only one does.
    pub fn variance(&self) -> Option<f64> {
        let m = self.mean()?;
        let total = self.total_weight();
        let squares: Vec<f64> = self.weights.iter().map(|w| w * w).collect();
        let denom = total - stats::kahan_sum(&squares) / total;
        if denom <= 0.0 {
            return Some(0.0);
        }
        let dev: Vec<f64> = self
            .values
            .iter()
            .zip(&self.weights)
            .map(|(v, w)| w * (v - m) * (v - m))
            .collect();
        Some(stats::kahan_sum(&dev) / denom)
    }

    /// Discretizes the samples onto `config.samples` equally spaced points
    /// between the smallest and largest weighted value.
    ///
    /// A single weighted value gives the degenerate distribution of
    /// [`DiscretizedDistribution::from_value`].
    ///
    /// # Errors
    /// - [`DistributionError::InvalidParameters`] if `config` is unusable.
    /// - [`DistributionError::Domain`] if no sample carries weight or the
    ///   values span more than the finite range.
    pub fn to_distribution(&self, config: DistributionConfig) -> Result<DiscretizedDistribution> {
        config.validate()?;
        let points: Vec<(f64, f64)> = self
            .values
            .iter()
            .copied()
            .zip(self.weights.iter().copied())
            .filter(|&(_, w)| w > 0.0)
            .collect();
        if points.is_empty() {
            return Err(DistributionError::Domain(
                "no sample carries positive weight".into(),
            ));
        }
        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(v, _)| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            return Ok(DiscretizedDistribution::from_value(lo, config));
        }

        let n = config.samples;
        let last = (n - 1) as f64;
        let dz = (hi - lo) / last;
        if !dz.is_finite() {
            return Err(DistributionError::Domain(format!(
                "samples span more than the finite range: {lo} to {hi}"
            )));
        }

        let mut mass = vec![0.0; n];
        for (v, w) in points {
            let pos = ((v - lo) / dz).clamp(0.0, last);
            let i = (pos.floor() as usize).min(n - 2);
            let frac = pos - i as f64;
            mass[i] += w * (1.0 - frac);
            mass[i + 1] += w * frac;
        }
        // end points own half a cell under the trapezoidal rule
        let pdf: Vec<f64> = mass
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let cell = if i == 0 || i == n - 1 { dz / 2.0 } else { dz };
                m / cell
            })
            .collect();

        DiscretizedDistribution::with_density(stats::linspace(lo, hi, n), pdf, config)
    }
}

impl DiscretizedDistribution {
    /// Distribution of weighted observations; see
    /// [`WeightedSamples::to_distribution`].
    ///
    /// # Errors
    /// As [`WeightedSamples::from_samples`] and
    /// [`WeightedSamples::to_distribution`].
    pub fn from_samples(
        values: &[f64],
        weights: &[f64],
        config: DistributionConfig,
    ) -> Result<Self> {
        WeightedSamples::from_samples(values, weights)?.to_distribution(config)
    }
}
