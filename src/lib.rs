//! # u-empirical
//!
//! Arithmetic on uncertain scalars represented as discretized probability
//! distributions.
//!
//! A [`DiscretizedDistribution`] samples a density on an ordered grid over
//! a bounded support. Quantities combine through the usual arithmetic
//! (`+ − × ÷`, negation, reciprocal) and are queried for density,
//! cumulative probability, percentiles, moments and random draws. The
//! crate knows nothing about the optimization problems that consume these
//! distributions.
//!
//! ## Modules
//!
//! - [`config`]: numeric constants ([`DistributionConfig`])
//! - [`error`]: error type for the strict constructors
//! - [`interpolate`]: linear interpolation and the `Stale`/`Fresh` cache cell
//! - [`stats`]: compensated trapezoidal integration, convolution, grids
//! - [`random`]: uniform draws for inverse-CDF sampling
//! - [`family`]: parametric density models (uniform, normal, linear, χ²)
//! - [`distribution`]: state, construction, queries and normalization
//! - [`sampled`]: distributions estimated from weighted observations
//! - `arithmetic`: unary, scalar and binary operators
//! - `mixture`: ratio-weighted mixtures ([`DiscretizedDistribution::merged`])
//!
//! ## Design Philosophy
//!
//! - **Repair, don't fail**: degenerate input (zero-width supports,
//!   non-positive resolutions, division by something that can be zero)
//!   resolves to a documented fallback distribution. `try_*` constructors
//!   report [`DistributionError`] for callers that prefer to reject it.
//! - **Lazy derived state**: grid, density and cumulative are built on
//!   first use; interpolators are rebuilt only after a mutation.
//! - **Numerical stability first**: Neumaier-compensated summation in
//!   every integral.
//! - **Property-based testing**: mass conservation and monotonicity
//!   verified via proptest.
//!
//! ## Example
//!
//! ```
//! use u_empirical::{DiscretizedDistribution, DistributionConfig};
//!
//! let cfg = DistributionConfig::default();
//! let mut cost = DiscretizedDistribution::uniform(10.0, 20.0, cfg);
//! let overhead = DiscretizedDistribution::normal(3.0, 0.5, cfg);
//! cost.add(&overhead).multiply_scalar(1.1);
//!
//! assert!((cost.mean() - 19.8).abs() < 0.05);
//! assert!(cost.percentile(0.95) > cost.median());
//! ```

mod arithmetic;
pub mod config;
pub mod distribution;
pub mod error;
pub mod family;
pub mod interpolate;
mod mixture;
pub mod random;
pub mod sampled;
pub mod stats;

pub use config::DistributionConfig;
pub use distribution::DiscretizedDistribution;
pub use error::{DistributionError, Result};
pub use family::DensityModel;
pub use random::UniformSource;
pub use sampled::WeightedSamples;
