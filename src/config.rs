//! Numeric constants that shape every discretized distribution.
//!
//! The sample counts, the minimum support width and the "full numeric
//! range" sentinels are carried by an explicit [`DistributionConfig`]
//! captured at construction, instead of process-wide constants.
//!
//! # Defaults
//!
//! | Field | Default | Used by |
//! |---|---|---|
//! | `min_samples` | 3 | default resolution, zero collapse |
//! | `samples` | 500 | parametric density models |
//! | `conv_samples` | 250 | convolution (`add`, `subtract`) |
//! | `mult_samples` | 100 | `multiply`, `divide`, `reciprocal` |
//! | `min_interval` | 0.001 | degenerate-support repair |
//! | `highest` | `f64::MAX / 2` | sentinel upper bound |
//! | `lowest` | `f64::MIN / 2` | sentinel lower bound |

use serde::{Deserialize, Serialize};

use crate::error::{DistributionError, Result};

/// Constants governing grid sizes and degenerate-case repair.
///
/// Deserializes with `#[serde(default)]`, so a partial document only
/// overrides the fields it names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Fewest grid points a distribution is ever resolved with.
    pub min_samples: usize,
    /// Grid points used by parametric density models.
    pub samples: usize,
    /// Samples given to the wider operand of a convolution.
    pub conv_samples: usize,
    /// Grid points of the result of `multiply`, `divide` and `reciprocal`.
    pub mult_samples: usize,
    /// Width a zero-width support is expanded to.
    pub min_interval: f64,
    /// Upper bound of the "not computable" fallback support.
    pub highest: f64,
    /// Lower bound of the "not computable" fallback support.
    pub lowest: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            samples: 500,
            conv_samples: 250,
            mult_samples: 100,
            min_interval: 0.001,
            highest: f64::MAX / 2.0,
            lowest: f64::MIN / 2.0,
        }
    }
}

impl DistributionConfig {
    /// Checks that the constants can drive the engine.
    ///
    /// # Errors
    /// Returns [`DistributionError::InvalidParameters`] when a sample count
    /// is below 2, `min_interval` is not a positive finite number, or the
    /// sentinels are not finite with `lowest < 0 < highest` and a finite
    /// distance between them.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("min_samples", self.min_samples),
            ("samples", self.samples),
            ("conv_samples", self.conv_samples),
            ("mult_samples", self.mult_samples),
        ];
        for (name, value) in counts {
            if value < 2 {
                return Err(DistributionError::InvalidParameters(format!(
                    "{name} must be at least 2, got {value}"
                )));
            }
        }
        if !self.min_interval.is_finite() || self.min_interval <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "min_interval must be positive and finite, got {}",
                self.min_interval
            )));
        }
        if !self.highest.is_finite() || !self.lowest.is_finite() {
            return Err(DistributionError::InvalidParameters(
                "sentinel bounds must be finite".into(),
            ));
        }
        if self.lowest >= 0.0 || self.highest <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "sentinels must satisfy lowest < 0 < highest, got {} and {}",
                self.lowest, self.highest
            )));
        }
        if !(self.highest - self.lowest).is_finite() {
            return Err(DistributionError::InvalidParameters(format!(
                "sentinel range overflows, got {} to {}",
                self.lowest, self.highest
            )));
        }
        Ok(())
    }

    /// Resolution of a freshly defaulted distribution on a unit support.
    pub(crate) fn default_resolution(&self) -> f64 {
        1.0 / (self.min_samples.max(2) - 1) as f64
    }
}
