//! Parametric density suppliers.
//!
//! A [`DensityModel`] tells a distribution how to fill in its density the
//! first time the grid is sampled. The arithmetic engine never looks inside
//! a model: every operator first materializes the density and then detaches
//! the model, leaving an [`Empirical`](DensityModel::Empirical) result.
//!
//! # Supported Families
//!
//! | Family | Parameters | Support | Density |
//! |---|---|---|---|
//! | [`Uniform`](DensityModel::Uniform) | lb, ub | `[lb, ub]` | `1/(ub−lb)` |
//! | [`Normal`](DensityModel::Normal) | μ, σ | `μ ± 6σ` | normal pdf |
//! | [`Linear`](DensityModel::Linear) | lb, ub, ascending | `[lb, ub]` | `2(z−lb)/(ub−lb)²` or mirrored |
//! | [`ChiSquared`](DensityModel::ChiSquared) | k | `[0, q(0.999)]` | cell-averaged χ²ₖ pdf |
//!
//! Closed-form densities come from `statrs`.

use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF, Normal};

use crate::config::DistributionConfig;
use crate::distribution::DiscretizedDistribution;
use crate::error::{DistributionError, Result};

/// Half-width of the normal support in standard deviations.
const NORMAL_SPAN: f64 = 6.0;

/// Cumulative probability at which the chi-squared support is cut.
const CHI_SQUARED_COVERAGE: f64 = 0.999;

/// Supplier of the density sampled onto a distribution's grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DensityModel {
    /// No closed form; the density is whatever was computed. When nothing
    /// has been computed yet it defaults to uniform.
    #[default]
    Empirical,
    /// Constant density over the support.
    Uniform,
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f64, std: f64 },
    /// Triangular ramp rising towards `ub` (or `lb` when descending).
    Linear { ascending: bool },
    /// Chi-squared with `dof` degrees of freedom.
    ChiSquared { dof: f64 },
}

impl DensityModel {
    /// Density at each grid point for a support `[lb, ub]`.
    ///
    /// The result is not normalized; the distribution renormalizes it.
    pub fn supply_density(&self, grid: &[f64], lb: f64, ub: f64) -> Vec<f64> {
        let width = ub - lb;
        match *self {
            DensityModel::Empirical | DensityModel::Uniform => vec![1.0 / width; grid.len()],
            DensityModel::Normal { mean, std } => match Normal::new(mean, std) {
                Ok(n) => grid.iter().map(|&z| n.pdf(z)).collect(),
                Err(_) => vec![1.0 / width; grid.len()],
            },
            DensityModel::Linear { ascending } => {
                let peak = 2.0 / width;
                grid.iter()
                    .map(|&z| {
                        let t = if ascending { z - lb } else { ub - z };
                        peak * (t / width).clamp(0.0, 1.0)
                    })
                    .collect()
            }
            DensityModel::ChiSquared { dof } => match ChiSquared::new(dof) {
                Ok(c) => cell_averaged(grid, |z| c.cdf(z)),
                Err(_) => vec![1.0 / width; grid.len()],
            },
        }
    }

    /// Whether the supplied density is the constant `1/(ub−lb)`.
    pub fn is_flat(&self) -> bool {
        matches!(self, DensityModel::Empirical | DensityModel::Uniform)
    }

    /// Parameter values, in the order of [`parameter_names`](Self::parameter_names).
    ///
    /// Support-defined families report the current bounds; the linear
    /// family encodes its direction as `+0.5` (ascending) or `−0.5`.
    pub fn parameters(&self, lb: f64, ub: f64) -> Vec<f64> {
        match *self {
            DensityModel::Empirical => Vec::new(),
            DensityModel::Uniform => vec![lb, ub],
            DensityModel::Normal { mean, std } => vec![mean, std],
            DensityModel::Linear { ascending } => {
                vec![lb, ub, if ascending { 0.5 } else { -0.5 }]
            }
            DensityModel::ChiSquared { dof } => vec![dof],
        }
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            DensityModel::Empirical => &[],
            DensityModel::Uniform => &["lower bound", "upper bound"],
            DensityModel::Normal { .. } => &["mean", "std"],
            DensityModel::Linear { .. } => &["lower bound", "upper bound", "is ascend"],
            DensityModel::ChiSquared { .. } => &["dof"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DensityModel::Empirical => "empirical",
            DensityModel::Uniform => "uniform",
            DensityModel::Normal { .. } => "normal",
            DensityModel::Linear { .. } => "linear",
            DensityModel::ChiSquared { .. } => "chi-squared",
        }
    }
}

/// Mean density over the cell around each grid point, from CDF differences.
///
/// Cells are bounded by the midpoints between neighbours and by the grid
/// ends. Stays finite where the point density diverges.
fn cell_averaged(grid: &[f64], cdf: impl Fn(f64) -> f64) -> Vec<f64> {
    let n = grid.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let lo = if i == 0 { grid[0] } else { 0.5 * (grid[i - 1] + grid[i]) };
            let hi = if i == n - 1 {
                grid[n - 1]
            } else {
                0.5 * (grid[i] + grid[i + 1])
            };
            ((cdf(hi) - cdf(lo)) / (hi - lo)).max(0.0)
        })
        .collect()
}

// ============================================================================
// Family constructors
// ============================================================================

impl DiscretizedDistribution {
    /// Uniform distribution on `[lb, ub]`; `lb >= ub` is repaired.
    ///
    /// # Examples
    /// ```
    /// use u_empirical::DiscretizedDistribution;
    /// let d = DiscretizedDistribution::uniform(0.0, 10.0, Default::default());
    /// assert!((d.variance() - 100.0 / 12.0).abs() < 1e-3);
    /// ```
    pub fn uniform(lb: f64, ub: f64, config: DistributionConfig) -> Self {
        Self::from_model(DensityModel::Uniform, lb, ub, config)
    }

    /// Normal distribution truncated to `mean ± 6·std`.
    ///
    /// A non-positive or non-finite `std` is replaced by 1.
    pub fn normal(mean: f64, std: f64, config: DistributionConfig) -> Self {
        let std = if std > 0.0 && std.is_finite() {
            std
        } else {
            tracing::warn!(std, "non-positive standard deviation, using 1");
            1.0
        };
        Self::from_model(
            DensityModel::Normal { mean, std },
            mean - NORMAL_SPAN * std,
            mean + NORMAL_SPAN * std,
            config,
        )
    }

    /// Strict variant of [`normal`](Self::normal).
    ///
    /// # Errors
    /// Returns [`DistributionError::InvalidParameters`] unless `mean` is
    /// finite and `std` is positive and finite, or if `config` is unusable.
    pub fn try_normal(mean: f64, std: f64, config: DistributionConfig) -> Result<Self> {
        config.validate()?;
        if !mean.is_finite() || !std.is_finite() || std <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "normal requires finite mean and std > 0, got mean={mean}, std={std}"
            )));
        }
        Ok(Self::normal(mean, std, config))
    }

    /// Linear ramp on `[lb, ub]`, peaking at `ub` when `ascending` and at
    /// `lb` otherwise.
    pub fn linear(lb: f64, ub: f64, ascending: bool, config: DistributionConfig) -> Self {
        Self::from_model(DensityModel::Linear { ascending }, lb, ub, config)
    }

    /// Chi-squared distribution on `[0, q(0.999)]`.
    ///
    /// A non-positive or non-finite `dof` is replaced by 1.
    pub fn chi_squared(dof: f64, config: DistributionConfig) -> Self {
        let dof = if dof > 0.0 && dof.is_finite() {
            dof
        } else {
            tracing::warn!(dof, "non-positive degrees of freedom, using 1");
            1.0
        };
        let ub = ChiSquared::new(dof)
            .map(|c| c.inverse_cdf(CHI_SQUARED_COVERAGE))
            .unwrap_or(f64::NAN);
        let ub = if ub.is_finite() && ub > 0.0 {
            ub
        } else {
            dof + NORMAL_SPAN * (2.0 * dof).sqrt()
        };
        Self::from_model(DensityModel::ChiSquared { dof }, 0.0, ub, config)
    }

    /// Strict variant of [`chi_squared`](Self::chi_squared).
    ///
    /// # Errors
    /// Returns [`DistributionError::InvalidParameters`] unless `dof` is
    /// positive and finite, or if `config` is unusable.
    pub fn try_chi_squared(dof: f64, config: DistributionConfig) -> Result<Self> {
        config.validate()?;
        if !dof.is_finite() || dof <= 0.0 {
            return Err(DistributionError::InvalidParameters(format!(
                "chi-squared requires dof > 0, got {dof}"
            )));
        }
        Ok(Self::chi_squared(dof, config))
    }
}
