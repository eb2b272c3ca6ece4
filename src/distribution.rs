//! The discretized distribution: state, construction and queries.
//!
//! A [`DiscretizedDistribution`] samples the density of an uncertain
//! scalar on an ordered grid spanning its support `[lb, ub]`. The grid,
//! the density and the cumulative are built lazily and cached together
//! with three interpolators (density, cumulative, quantile).
//!
//! # Invariants
//!
//! After every public operation:
//! - `lb < ub` (a zero-width support is widened by `min_interval`);
//! - `(ub − lb)` is an integer multiple of the resolution;
//! - the grid is strictly increasing with `grid[0] == lb`, `grid[n−1] == ub`;
//! - grid, density and cumulative have the same length whenever any of
//!   them is non-empty;
//! - the cumulative starts at 0, ends at 1 and never decreases, and the
//!   density integrates to 1 (trapezoidal rule).
//!
//! # Laziness
//!
//! Derived arrays sit behind a [`RefCell`], so queries take `&self` and
//! binary operators can read their right-hand operand without mutating
//! it. The type is `Send` but not `Sync`.

use std::cell::RefCell;

use crate::config::DistributionConfig;
use crate::error::{DistributionError, Result};
use crate::family::DensityModel;
use crate::interpolate::{Cached, LinearInterpolator};
use crate::random::UniformSource;
use crate::stats;

/// Support and resolution, copied out so the lazily built tables can be
/// regenerated without borrowing the whole distribution.
#[derive(Debug, Clone, Copy)]
struct Support {
    lb: f64,
    ub: f64,
    dz: f64,
}

impl Support {
    fn width(&self) -> f64 {
        self.ub - self.lb
    }

    /// Number of points of an equally spaced grid at this resolution.
    fn equally_spaced_len(&self) -> usize {
        let steps = (self.width() / self.dz).round();
        if steps.is_finite() && steps >= 1.0 {
            steps as usize + 1
        } else {
            2
        }
    }
}

/// Both bounds and the width between them are finite.
pub(crate) fn spans_finitely(lb: f64, ub: f64) -> bool {
    lb.is_finite() && ub.is_finite() && (ub - lb).is_finite()
}

/// Lazily derived arrays and their interpolators.
#[derive(Debug, Default)]
struct Tables {
    z: Vec<f64>,
    pdf: Vec<f64>,
    cdf: Vec<f64>,
    pdf_interp: Cached<LinearInterpolator>,
    cdf_interp: Cached<LinearInterpolator>,
    quantile_interp: Cached<LinearInterpolator>,
}

impl Tables {
    fn invalidate(&mut self) {
        self.pdf_interp.invalidate();
        self.cdf_interp.invalidate();
        self.quantile_interp.invalidate();
    }

    fn clear_density(&mut self) {
        self.pdf.clear();
        self.cdf.clear();
        self.invalidate();
    }

    fn clear(&mut self) {
        self.z.clear();
        self.clear_density();
    }

    fn ensure_grid(&mut self, s: Support) {
        if self.z.is_empty() {
            self.z = stats::linspace(s.lb, s.ub, s.equally_spaced_len());
            self.clear_density();
        }
    }

    /// Builds grid, density and cumulative as needed, leaving all three
    /// the same length.
    fn materialize(&mut self, s: Support, model: &DensityModel) {
        self.ensure_grid(s);
        if self.pdf.len() != self.z.len() {
            self.pdf = model.supply_density(&self.z, s.lb, s.ub);
            self.calculate_cdf(s, model);
        } else if self.cdf.len() != self.z.len() {
            self.calculate_cdf(s, model);
        }
    }

    /// Integrates the density into the cumulative and renormalizes both.
    fn calculate_cdf(&mut self, s: Support, model: &DensityModel) {
        self.ensure_grid(s);
        if self.pdf.len() != self.z.len() {
            self.pdf = model.supply_density(&self.z, s.lb, s.ub);
        }
        self.invalidate();

        self.cdf = stats::cumulative_trapezoid(&self.z, &self.pdf);
        let mut factor = self.cdf.last().copied().unwrap_or(0.0);
        if factor == 1.0 {
            return;
        }
        if factor == 0.0 || !factor.is_finite() {
            tracing::debug!(
                integral = factor,
                lb = s.lb,
                ub = s.ub,
                "density does not integrate, replacing with uniform"
            );
            self.pdf = vec![1.0 / s.width(); self.z.len()];
            self.cdf = stats::cumulative_trapezoid(&self.z, &self.pdf);
            factor = self.cdf.last().copied().unwrap_or(1.0);
            if factor == 1.0 || factor == 0.0 || !factor.is_finite() {
                return;
            }
        }
        for v in self.pdf.iter_mut() {
            *v /= factor;
        }
        for v in self.cdf.iter_mut() {
            *v /= factor;
        }
    }
}

/// Discretized probability distribution of an uncertain scalar.
///
/// # Examples
/// ```
/// use u_empirical::DiscretizedDistribution;
/// let d = DiscretizedDistribution::uniform(0.0, 10.0, Default::default());
/// assert!((d.mean() - 5.0).abs() < 1e-9);
/// assert!((d.percentile(0.5) - 5.0).abs() < 1e-9);
/// assert_eq!(d.pdf(11.0), 0.0);
/// ```
#[derive(Debug)]
pub struct DiscretizedDistribution {
    config: DistributionConfig,
    model: DensityModel,
    lb: f64,
    ub: f64,
    dz: f64,
    tables: RefCell<Tables>,
}

impl Default for DiscretizedDistribution {
    fn default() -> Self {
        Self::new(DistributionConfig::default())
    }
}

impl Clone for DiscretizedDistribution {
    /// Copies grid, density and cumulative; interpolators start stale.
    fn clone(&self) -> Self {
        let t = self.tables.borrow();
        Self {
            config: self.config,
            model: self.model.clone(),
            lb: self.lb,
            ub: self.ub,
            dz: self.dz,
            tables: RefCell::new(Tables {
                z: t.z.clone(),
                pdf: t.pdf.clone(),
                cdf: t.cdf.clone(),
                ..Default::default()
            }),
        }
    }
}

// ============================================================================
// Construction & boundary management
// ============================================================================

impl DiscretizedDistribution {
    /// Uniform distribution on `[0, 1]` resolved with `min_samples` points.
    ///
    /// Grid and density stay empty until first needed.
    pub fn new(config: DistributionConfig) -> Self {
        Self {
            config,
            model: DensityModel::Empirical,
            lb: 0.0,
            ub: 1.0,
            dz: config.default_resolution(),
            tables: RefCell::new(Tables::default()),
        }
    }

    /// Degenerate distribution for an effectively certain `value`.
    ///
    /// The support becomes `[value, value + min_interval]`.
    ///
    /// # Examples
    /// ```
    /// use u_empirical::DiscretizedDistribution;
    /// let d = DiscretizedDistribution::from_value(5.0, Default::default());
    /// assert_eq!(d.lower_bound(), 5.0);
    /// assert!(d.upper_bound() > 5.0);
    /// ```
    pub fn from_value(value: f64, config: DistributionConfig) -> Self {
        let mut d = Self::new(config);
        d.set_boundaries(value, value);
        d
    }

    /// Uniform distribution on `[lb, ub]` with the default resolution,
    /// repairing `lb >= ub`.
    pub fn with_bounds(lb: f64, ub: f64, config: DistributionConfig) -> Self {
        let mut d = Self::new(config);
        d.set_boundaries(lb, ub);
        d
    }

    /// Strict variant of [`with_bounds`](Self::with_bounds).
    ///
    /// # Errors
    /// - [`DistributionError::InvalidParameters`] if `config` is unusable.
    /// - [`DistributionError::Domain`] if a bound is not finite or
    ///   `lb >= ub`.
    pub fn try_with_bounds(lb: f64, ub: f64, config: DistributionConfig) -> Result<Self> {
        config.validate()?;
        if !lb.is_finite() || !ub.is_finite() || lb >= ub {
            return Err(DistributionError::Domain(format!(
                "support requires finite lb < ub, got lb={lb}, ub={ub}"
            )));
        }
        Ok(Self::with_bounds(lb, ub, config))
    }

    /// Distribution with an explicit grid and density.
    ///
    /// Pairs are sorted by grid value; repeated grid values keep the first
    /// density. The density is normalized on construction.
    ///
    /// # Errors
    /// - [`DistributionError::InvalidParameters`] if `config` is unusable.
    /// - [`DistributionError::Domain`] if the lengths differ, fewer than two
    ///   distinct grid points remain, or any value is not finite or a
    ///   density is negative.
    pub fn with_density(z: Vec<f64>, pdf: Vec<f64>, config: DistributionConfig) -> Result<Self> {
        config.validate()?;
        if z.len() != pdf.len() {
            return Err(DistributionError::Domain(format!(
                "grid has {} points but density has {}",
                z.len(),
                pdf.len()
            )));
        }
        if z.iter().any(|v| !v.is_finite()) {
            return Err(DistributionError::Domain("grid values must be finite".into()));
        }
        if pdf.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(DistributionError::Domain(
                "density values must be finite and non-negative".into(),
            ));
        }

        let mut pairs: Vec<(f64, f64)> = z.into_iter().zip(pdf).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|next, prev| next.0 == prev.0);
        if pairs.len() < 2 {
            return Err(DistributionError::Domain(
                "at least two distinct grid points are required".into(),
            ));
        }
        let (z, pdf): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        let mut d = Self::new(config);
        let dz = (z[z.len() - 1] - z[0]) / (z.len() - 1) as f64;
        d.replace_tables(z, pdf, dz);
        Ok(d)
    }

    /// Distribution whose density is supplied by `model` on `[lb, ub]`,
    /// resolved with `config.samples` points and materialized eagerly.
    pub(crate) fn from_model(
        model: DensityModel,
        lb: f64,
        ub: f64,
        config: DistributionConfig,
    ) -> Self {
        let mut d = Self::new(config);
        d.set_boundaries(lb, ub);
        d.snap_resolution(d.width() / (config.samples.max(2) - 1) as f64);
        d.model = model;
        let s = d.support();
        let t = d.tables.get_mut();
        t.clear();
        t.materialize(s, &d.model);
        d
    }

    /// Resets to the default uniform-on-`[0, 1]` state, keeping the config.
    pub fn clear(&mut self) {
        *self = Self::new(self.config);
    }

    /// Moves the support to `[lb, ub]`, stretching the existing grid.
    ///
    /// - `lb >= ub` is repaired to `[lb, lb + min_interval]`.
    /// - Non-finite bounds, or bounds whose width overflows, are ignored.
    /// - Grid points map linearly from the old support onto the new one.
    /// - The resolution is scaled by the same ratio and re-snapped.
    /// - An existing density is renormalized.
    ///
    /// A parametric density model is detached first: the distribution
    /// becomes empirical.
    pub fn define_boundaries(&mut self, lb: f64, ub: f64) {
        self.detach_model();
        self.set_boundaries(lb, ub);
    }

    /// Replaces the grid with an arbitrary point set.
    ///
    /// Points are sorted and deduplicated; non-finite points are dropped.
    /// With a single remaining point the distribution collapses onto it as
    /// in [`from_value`](Self::from_value) and becomes empirical. An empty
    /// set is ignored. The
    /// density is discarded and regenerated from the density model on the
    /// next query.
    pub fn define_grid(&mut self, mut z: Vec<f64>) {
        z.retain(|v| v.is_finite());
        z.sort_by(f64::total_cmp);
        z.dedup();

        match z.len() {
            0 => {
                tracing::warn!("ignoring empty grid");
            }
            1 => {
                self.model = DensityModel::Empirical;
                self.tables.get_mut().clear();
                self.set_boundaries(z[0], z[0]);
            }
            n => {
                self.lb = z[0];
                self.ub = z[n - 1];
                self.snap_resolution(self.dz);
                let t = self.tables.get_mut();
                t.z = z;
                t.clear_density();
            }
        }
    }

    /// Sets the target sample spacing.
    ///
    /// Ignored unless `dz > 0`. The stored value is snapped down so the
    /// support width is an exact multiple: `w / ceil(w / dz)`.
    pub fn define_resolution(&mut self, dz: f64) {
        if dz > 0.0 {
            self.snap_resolution(dz);
        }
    }

    /// Strict variant of [`define_resolution`](Self::define_resolution).
    ///
    /// # Errors
    /// Returns [`DistributionError::Domain`] unless `dz` is positive and
    /// finite.
    pub fn try_define_resolution(&mut self, dz: f64) -> Result<()> {
        if !dz.is_finite() || dz <= 0.0 {
            return Err(DistributionError::Domain(format!(
                "resolution must be positive and finite, got {dz}"
            )));
        }
        self.snap_resolution(dz);
        Ok(())
    }

    fn snap_resolution(&mut self, dz: f64) {
        let w = self.width();
        let steps = w / dz;
        let nearest = steps.round();
        // absorb rounding noise so w / (w / n) keeps n steps
        let steps = if (steps - nearest).abs() <= 1e-9 * nearest {
            nearest
        } else {
            steps.ceil()
        };
        let snapped = w / steps.max(1.0);
        if snapped.is_finite() && snapped > 0.0 {
            self.dz = snapped;
        }
    }

    /// Repairs `lb >= ub` by widening to `[lb, lb + min_interval]`.
    ///
    /// Where `min_interval` vanishes against the magnitude of `lb` the
    /// widening is relative instead.
    fn repair_support(&self, lb: f64, ub: f64) -> (f64, f64) {
        if lb < ub {
            return (lb, ub);
        }
        let mi = self.config.min_interval;
        let mut widened = lb + mi;
        if widened <= lb {
            widened = lb + lb.abs() * mi;
        }
        tracing::debug!(lb, ub, widened, "expanded degenerate support");
        (lb, widened)
    }

    /// Boundary update that keeps the density model.
    pub(crate) fn set_boundaries(&mut self, lb: f64, ub: f64) {
        if !spans_finitely(lb, ub) {
            tracing::warn!(lb, ub, "ignoring non-finite bounds");
            return;
        }
        let (lb, ub) = self.repair_support(lb, ub);
        let (old_lb, old_width) = (self.lb, self.width());
        let new_width = ub - lb;
        let ratio = new_width / old_width;

        self.lb = lb;
        self.ub = ub;
        let scaled = self.dz * ratio;
        if scaled.is_finite() && scaled > 0.0 {
            self.snap_resolution(scaled);
        } else {
            self.snap_resolution(new_width / (self.config.min_samples.max(2) - 1) as f64);
        }

        let s = self.support();
        let t = self.tables.get_mut();
        if !t.z.is_empty() {
            for v in t.z.iter_mut() {
                *v = lb + (*v - old_lb) / old_width * new_width;
            }
            let n = t.z.len();
            t.z[0] = lb;
            t.z[n - 1] = ub;
        }
        t.invalidate();
        if !t.pdf.is_empty() {
            t.calculate_cdf(s, &self.model);
        }
    }

    /// Installs freshly computed arrays and normalizes them.
    ///
    /// `z` must be strictly increasing with at least two points and the
    /// same length as `pdf`.
    pub(crate) fn replace_tables(&mut self, z: Vec<f64>, pdf: Vec<f64>, dz: f64) {
        debug_assert!(z.len() >= 2 && z.len() == pdf.len());
        self.model = DensityModel::Empirical;
        self.lb = z[0];
        self.ub = z[z.len() - 1];
        self.dz = dz;
        self.snap_resolution(dz);
        let s = self.support();
        let t = self.tables.get_mut();
        t.z = z;
        t.pdf = pdf;
        t.calculate_cdf(s, &self.model);
    }

    /// Uniform density over `[lb, ub]` on an equally spaced grid of
    /// `mult_samples` points; used where a result has no finite support.
    ///
    /// Bounds are clamped into `[lowest, highest]` first.
    pub(crate) fn spread_uniform(&mut self, lb: f64, ub: f64) {
        tracing::debug!(lb, ub, "result not computable on a finite support, spreading uniformly");
        let (lo, hi) = (self.config.lowest, self.config.highest);
        let (lb, ub) = (lb.max(lo).min(hi), ub.max(lo).min(hi));
        self.model = DensityModel::Empirical;
        self.tables.get_mut().clear();
        let (lb, ub) = self.repair_support(lb, ub);
        self.lb = lb;
        self.ub = ub;
        self.dz = self.width();
        self.snap_resolution(self.width() / (self.config.mult_samples.max(2) - 1) as f64);
        let s = self.support();
        let t = self.tables.get_mut();
        t.materialize(s, &DensityModel::Empirical);
    }

    /// Moves support and grid through a monotone `map`, keeping each density
    /// value attached to its (moved) grid point.
    ///
    /// A decreasing map reverses grid and density so the grid stays
    /// increasing. The resolution becomes `dz`, snapped. An existing
    /// density is renormalized.
    pub(crate) fn remap(&mut self, map: impl Fn(f64) -> f64, decreasing: bool, dz: f64) {
        let (a, b) = (map(self.lb), map(self.ub));
        let (lb, ub) = if decreasing { (b, a) } else { (a, b) };

        if !spans_finitely(lb, ub) {
            self.spread_uniform(lb, ub);
            return;
        }
        if lb >= ub {
            tracing::debug!(lb, ub, "support collapsed under remapping");
            let (lb, ub) = self.repair_support(lb, ub);
            self.lb = lb;
            self.ub = ub;
            self.snap_resolution(self.width() / (self.config.min_samples.max(2) - 1) as f64);
            self.tables.get_mut().clear();
            return;
        }

        self.lb = lb;
        self.ub = ub;
        self.snap_resolution(dz);

        let s = self.support();
        let t = self.tables.get_mut();
        t.invalidate();
        if t.z.is_empty() {
            return;
        }
        for v in t.z.iter_mut() {
            *v = map(*v);
        }
        if decreasing {
            t.z.reverse();
            t.pdf.reverse();
        }
        let n = t.z.len();
        t.z[0] = lb;
        t.z[n - 1] = ub;
        if t.z.windows(2).any(|w| w[0] >= w[1]) {
            tracing::debug!(lb, ub, "grid points merged under remapping, regenerating");
            t.clear();
            return;
        }
        if !t.pdf.is_empty() {
            t.calculate_cdf(s, &self.model);
        }
    }

    /// Materializes a non-uniform model's density and forgets the model.
    pub(crate) fn detach_model(&mut self) {
        if self.model.is_flat() {
            self.model = DensityModel::Empirical;
            return;
        }
        tracing::trace!(model = self.model.name(), "materializing density model");
        let s = self.support();
        self.tables.get_mut().materialize(s, &self.model);
        self.model = DensityModel::Empirical;
    }

    fn support(&self) -> Support {
        Support {
            lb: self.lb,
            ub: self.ub,
            dz: self.dz,
        }
    }

    fn width(&self) -> f64 {
        self.ub - self.lb
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl DiscretizedDistribution {
    pub fn lower_bound(&self) -> f64 {
        self.lb
    }

    pub fn upper_bound(&self) -> f64 {
        self.ub
    }

    /// Target spacing used when the grid is regenerated.
    pub fn resolution(&self) -> f64 {
        self.dz
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Supplier of the density when it is (re)generated.
    pub fn model(&self) -> &DensityModel {
        &self.model
    }

    /// Number of grid points, generating the grid if needed.
    pub fn n_samples(&self) -> usize {
        let mut t = self.tables.borrow_mut();
        t.ensure_grid(self.support());
        t.z.len()
    }

    /// Whether the density has been materialized.
    pub fn has_density(&self) -> bool {
        !self.tables.borrow().pdf.is_empty()
    }

    /// Copy of the grid, generating it if needed.
    pub fn grid(&self) -> Vec<f64> {
        let mut t = self.tables.borrow_mut();
        t.ensure_grid(self.support());
        t.z.clone()
    }

    /// Copy of the density at the grid points, generating it if needed.
    pub fn density(&self) -> Vec<f64> {
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        t.pdf.clone()
    }

    /// Copy of the cumulative at the grid points, generating it if needed.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        t.cdf.clone()
    }

    /// Parameters of the density model (empty for an empirical density).
    pub fn parameters(&self) -> Vec<f64> {
        self.model.parameters(self.lb, self.ub)
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.model.parameter_names()
    }
}

// ============================================================================
// Normalization
// ============================================================================

impl DiscretizedDistribution {
    /// Integrates the density into the cumulative and renormalizes.
    ///
    /// The density is generated first if absent. A density integrating to
    /// exactly 1 is left untouched; one integrating to 0 (or to a
    /// non-finite value) is replaced by the uniform density; otherwise
    /// density and cumulative are both divided by the integral.
    pub fn calculate_cdf(&mut self) {
        let s = self.support();
        self.tables.get_mut().calculate_cdf(s, &self.model);
    }

    /// Renormalizes an existing density; no-op when there is none.
    pub fn normalise(&mut self) {
        if self.has_density() {
            self.calculate_cdf();
        }
    }
}

// ============================================================================
// Query API
// ============================================================================

impl DiscretizedDistribution {
    /// Density at `z`; 0 outside the support, linear between grid points.
    pub fn pdf(&self, z: f64) -> f64 {
        if z < self.lb || z > self.ub {
            return 0.0;
        }
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        let Tables {
            z: grid,
            pdf,
            pdf_interp,
            ..
        } = &mut *t;
        pdf_interp
            .get_or_rebuild(|| LinearInterpolator::new(grid.clone(), pdf.clone()))
            .interpolate(z)
    }

    /// Cumulative probability at `z`; 0 at or below `lb`, 1 at or above `ub`.
    pub fn cdf(&self, z: f64) -> f64 {
        if z <= self.lb {
            return 0.0;
        }
        if z >= self.ub {
            return 1.0;
        }
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        let Tables {
            z: grid,
            cdf,
            cdf_interp,
            ..
        } = &mut *t;
        cdf_interp
            .get_or_rebuild(|| LinearInterpolator::new(grid.clone(), cdf.clone()))
            .interpolate(z)
    }

    /// Pointwise [`pdf`](Self::pdf).
    pub fn pdf_many(&self, zs: &[f64]) -> Vec<f64> {
        zs.iter().map(|&z| self.pdf(z)).collect()
    }

    /// Pointwise [`cdf`](Self::cdf).
    pub fn cdf_many(&self, zs: &[f64]) -> Vec<f64> {
        zs.iter().map(|&z| self.cdf(z)).collect()
    }

    /// Value below which a fraction `p` of the mass lies.
    ///
    /// `p <= 0` gives `lb`, `p >= 1` gives `ub`; NaN gives NaN.
    pub fn percentile(&self, p: f64) -> f64 {
        if p.is_nan() {
            return f64::NAN;
        }
        if p <= 0.0 {
            return self.lb;
        }
        if p >= 1.0 {
            return self.ub;
        }
        self.quantile(p)
    }

    /// `percentile(0.5)`.
    pub fn median(&self) -> f64 {
        self.percentile(0.5)
    }

    /// Trapezoidal integral of `z · pdf(z)` over the grid.
    pub fn mean(&self) -> f64 {
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        stats::trapezoid_weighted(&t.z, &t.pdf, |z| z)
    }

    /// Trapezoidal integral of `z² · pdf(z)` minus the squared mean.
    ///
    /// Rounding can push the difference slightly below zero; it is clamped
    /// to 0. A second moment that overflows (a support reaching the
    /// sentinels) gives `f64::INFINITY`.
    pub fn variance(&self) -> f64 {
        let m = self.mean();
        let second = {
            let mut t = self.tables.borrow_mut();
            t.materialize(self.support(), &self.model);
            stats::trapezoid_weighted(&t.z, &t.pdf, |z| z * z)
        };
        let v = second - m * m;
        if !v.is_finite() {
            f64::INFINITY
        } else if v < 0.0 {
            0.0
        } else {
            v
        }
    }

    /// Square root of [`variance`](Self::variance).
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Draws one value by inverse-CDF sampling.
    ///
    /// A draw at or below `cdf[0]` returns `lb`.
    ///
    /// # Examples
    /// ```
    /// use u_empirical::DiscretizedDistribution;
    /// use u_empirical::random::create_rng;
    /// let d = DiscretizedDistribution::uniform(2.0, 4.0, Default::default());
    /// let mut rng = create_rng(42);
    /// let x = d.sample(&mut rng);
    /// assert!((2.0..=4.0).contains(&x));
    /// ```
    pub fn sample<S: UniformSource + ?Sized>(&self, rng: &mut S) -> f64 {
        let r = rng.next_unit();
        let below_first = {
            let mut t = self.tables.borrow_mut();
            t.materialize(self.support(), &self.model);
            r <= t.cdf[0]
        };
        if below_first {
            return self.lb;
        }
        self.quantile(r)
    }

    /// `n` independent draws.
    pub fn sample_n<S: UniformSource + ?Sized>(&self, n: usize, rng: &mut S) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    fn quantile(&self, p: f64) -> f64 {
        let mut t = self.tables.borrow_mut();
        t.materialize(self.support(), &self.model);
        let Tables {
            z: grid,
            cdf,
            quantile_interp,
            ..
        } = &mut *t;
        quantile_interp
            .get_or_rebuild(|| LinearInterpolator::new(cdf.clone(), grid.clone()))
            .interpolate(p)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn density_strategy() -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(0.0_f64..10.0, 3..80)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn normalized_mass_is_one(
            lb in -100.0_f64..100.0,
            width in 0.01_f64..50.0,
            pdf in density_strategy(),
        ) {
            let z = stats::linspace(lb, lb + width, pdf.len());
            let d = DiscretizedDistribution::with_density(z, pdf, DistributionConfig::default()).unwrap();
            let cdf = d.cumulative();
            prop_assert_eq!(cdf[0], 0.0);
            prop_assert!((cdf[cdf.len() - 1] - 1.0).abs() < 1e-9);
            prop_assert!((stats::trapezoid(&d.grid(), &d.density()) - 1.0).abs() < 1e-9);
            prop_assert!(cdf.windows(2).all(|w| w[0] <= w[1] + 1e-15));
        }

        #[test]
        fn pdf_vanishes_outside_support(
            lb in -100.0_f64..100.0,
            width in 0.01_f64..50.0,
            offset in 1e-6_f64..100.0,
        ) {
            let d = DiscretizedDistribution::with_bounds(lb, lb + width, DistributionConfig::default());
            prop_assert_eq!(d.pdf(lb - offset), 0.0);
            prop_assert_eq!(d.pdf(lb + width + offset), 0.0);
            for z in d.grid() {
                prop_assert!(z >= d.lower_bound() && z <= d.upper_bound());
            }
        }

        #[test]
        fn percentile_inverts_cdf(
            pdf in proptest::collection::vec(0.1_f64..10.0, 3..60),
            p in 0.01_f64..0.99,
        ) {
            let z = stats::linspace(0.0, 1.0, pdf.len());
            let d = DiscretizedDistribution::with_density(z, pdf, DistributionConfig::default()).unwrap();
            let x = d.percentile(p);
            prop_assert!((d.cdf(x) - p).abs() < 1e-6);
        }
    }
}
