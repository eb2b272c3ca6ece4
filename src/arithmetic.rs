//! Arithmetic on uncertain quantities.
//!
//! Every operator rewrites the left operand in place and returns it for
//! chaining. The right operand of a binary operator is only read through
//! its query surface.
//!
//! # Algorithms
//!
//! | Operation | Method |
//! |---|---|
//! | `x + c`, `c·x`, `−x` | remap support and grid, keep density values |
//! | `x + y` | resample both onto a common spacing, discrete convolution |
//! | `x · y` | ∫ f(t)·g(z/t)/\|t\| dt on the left operand's grid |
//! | `x / y` | ∫ g(s)·f(z·s)·\|s\| ds on the divisor's grid |
//! | `1/x` | change of variables, Jacobian `1/z²` |
//!
//! Operations whose result has no finite support (dividing by, or taking
//! the reciprocal of, something that can be zero) spread a uniform density
//! over the configured sentinel range instead of failing.
//!
//! Results of every operator are empirical: a parametric density model is
//! materialized and dropped first.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::distribution::{spans_finitely, DiscretizedDistribution};
use crate::stats;

// ============================================================================
// Unary operators
// ============================================================================

impl DiscretizedDistribution {
    /// Mirrors the distribution about zero: `[lb, ub]` becomes `[−ub, −lb]`.
    pub fn negate(&mut self) -> &mut Self {
        self.detach_model();
        let dz = self.resolution();
        self.remap(|z| -z, true, dz);
        self
    }

    /// Distribution of `1/x`.
    ///
    /// A support that straddles or touches zero has no finite reciprocal;
    /// the result is uniform over the sentinel range on the side(s) the
    /// reciprocal can reach. Otherwise the new support is `[1/ub, 1/lb]`
    /// sampled with `mult_samples` points.
    pub fn reciprocal(&mut self) -> &mut Self {
        self.detach_model();
        let (lb, ub) = (self.lower_bound(), self.upper_bound());
        let cfg = *self.config();

        if lb <= 0.0 && ub >= 0.0 {
            let (new_lb, new_ub) = if lb < 0.0 && ub > 0.0 {
                (cfg.lowest, cfg.highest)
            } else if lb == 0.0 {
                (0.0, cfg.highest)
            } else {
                (cfg.lowest, 0.0)
            };
            self.spread_uniform(new_lb, new_ub);
            return self;
        }

        let (new_lb, new_ub) = (1.0 / ub, 1.0 / lb);
        let n = cfg.mult_samples.max(2);
        let z = stats::linspace(new_lb, new_ub, n);
        let pdf: Vec<f64> = z
            .iter()
            .map(|&v| {
                let old = (1.0 / v).clamp(lb, ub);
                self.pdf(old) * old * old
            })
            .collect();
        self.install(z, pdf);
        self
    }
}

// ============================================================================
// Scalar operators
// ============================================================================

impl DiscretizedDistribution {
    /// Shifts the distribution by `x`. A non-finite `x` is ignored.
    pub fn add_scalar(&mut self, x: f64) -> &mut Self {
        if !x.is_finite() {
            tracing::warn!(x, "ignoring non-finite shift");
            return self;
        }
        self.detach_model();
        let dz = self.resolution();
        self.remap(|z| z + x, false, dz);
        self
    }

    /// `add_scalar(-x)`.
    pub fn subtract_scalar(&mut self, x: f64) -> &mut Self {
        self.add_scalar(-x)
    }

    /// Scales the distribution by `s`.
    ///
    /// - `s == 0` collapses onto `[0, min_interval]` with uniform mass.
    /// - `s < 0` negates, then scales by `|s|`.
    /// - A non-finite `s` is ignored.
    pub fn multiply_scalar(&mut self, s: f64) -> &mut Self {
        if !s.is_finite() {
            tracing::warn!(s, "ignoring non-finite scale factor");
            return self;
        }
        if s == 0.0 {
            self.collapse_to_zero();
            return self;
        }
        self.detach_model();
        if s < 0.0 {
            self.negate();
        }
        let k = s.abs();
        let dz = self.resolution() * k;
        self.remap(|z| z * k, false, dz);
        self
    }

    /// `multiply_scalar(1/s)`; dividing by zero leaves the distribution
    /// unchanged.
    ///
    /// A divisor so small that `1/s` overflows still divides: the support
    /// is mapped through `z / |s|` and, when that leaves the finite range,
    /// spread over the sentinels.
    pub fn divide_scalar(&mut self, s: f64) -> &mut Self {
        if s == 0.0 {
            tracing::debug!("ignoring division by zero scalar");
            return self;
        }
        let k = 1.0 / s;
        if k.is_finite() || !s.is_finite() {
            return self.multiply_scalar(k);
        }
        self.detach_model();
        if s < 0.0 {
            self.negate();
        }
        let d = s.abs();
        let dz = self.resolution() / d;
        self.remap(|z| z / d, false, dz);
        self
    }

    fn collapse_to_zero(&mut self) {
        let cfg = *self.config();
        let n = cfg.min_samples.max(2);
        tracing::debug!(width = cfg.min_interval, "scaling by zero, collapsing onto 0");
        let z = stats::linspace(0.0, cfg.min_interval, n);
        let dz = cfg.min_interval / (n - 1) as f64;
        self.replace_tables(z, vec![1.0; n], dz);
    }
}

// ============================================================================
// Binary operators
// ============================================================================

impl DiscretizedDistribution {
    /// Distribution of the sum of two independent quantities.
    ///
    /// Both operands are sampled at a common spacing of
    /// `max(width) / conv_samples` and their densities convolved. The
    /// support becomes `[lb + other.lb, ub + other.ub]`.
    ///
    /// # Examples
    /// ```
    /// use u_empirical::DiscretizedDistribution;
    /// let cfg = Default::default();
    /// let mut a = DiscretizedDistribution::uniform(0.0, 1.0, cfg);
    /// let b = DiscretizedDistribution::uniform(0.0, 1.0, cfg);
    /// a.add(&b);
    /// assert_eq!(a.upper_bound(), 2.0);
    /// assert!((a.mean() - 1.0).abs() < 1e-6);
    /// ```
    pub fn add(&mut self, other: &DiscretizedDistribution) -> &mut Self {
        self.detach_model();
        let (lb_t, ub_t) = (self.lower_bound(), self.upper_bound());
        let (lb_o, ub_o) = (other.lower_bound(), other.upper_bound());
        let (lb, ub) = (lb_t + lb_o, ub_t + ub_o);
        if !spans_finitely(lb, ub) {
            self.spread_uniform(lb, ub);
            return self;
        }

        let (w_t, w_o) = (ub_t - lb_t, ub_o - lb_o);
        let step = w_t.max(w_o) / self.config().conv_samples.max(1) as f64;
        let n_t = steps_across(w_t, step) + 1;
        let n_o = steps_across(w_o, step) + 1;
        let pdf_t = self.pdf_many(&stats::linspace(lb_t, ub_t, n_t));
        let pdf_o = other.pdf_many(&stats::linspace(lb_o, ub_o, n_o));

        let z = stats::linspace(lb, ub, n_t + n_o - 1);
        self.install(z, stats::convolve(&pdf_t, &pdf_o));
        self
    }

    /// Distribution of the difference; `other` is left untouched.
    pub fn subtract(&mut self, other: &DiscretizedDistribution) -> &mut Self {
        let mut negated = other.clone();
        negated.negate();
        self.add(&negated)
    }

    /// Distribution of the product of two independent quantities.
    ///
    /// The support spans the extremes of the four bound products. Grid
    /// points of the left operand inside the band `|t| < dt/2` around zero
    /// are replaced by the two band edges at half weight each.
    pub fn multiply(&mut self, other: &DiscretizedDistribution) -> &mut Self {
        self.detach_model();
        let (lb_t, ub_t) = (self.lower_bound(), self.upper_bound());
        let (lb_o, ub_o) = (other.lower_bound(), other.upper_bound());
        let (lb, ub) = extremes([lb_t * lb_o, lb_t * ub_o, ub_t * lb_o, ub_t * ub_o]);
        if self.settle_degenerate(lb, ub) {
            return self;
        }

        let n = self.config().mult_samples.max(2);
        let z = stats::linspace(lb, ub, n);
        let zt = stats::linspace(lb_t, ub_t, n);
        let dt = (ub_t - lb_t) / (n - 1) as f64;
        let half = dt / 2.0;
        let pdf_t = self.pdf_many(&zt);
        let band = [(-half, self.pdf(-half)), (half, self.pdf(half))];
        let in_other = |v: f64| v >= lb_o && v <= ub_o;

        let pdf: Vec<f64> = z
            .iter()
            .map(|&zi| {
                let mut acc = 0.0;
                for (&t, &ft) in zt.iter().zip(&pdf_t) {
                    if t.abs() >= half {
                        let zo = zi / t;
                        if in_other(zo) {
                            acc += ft * other.pdf(zo) / t.abs();
                        }
                    } else {
                        for &(edge, fe) in &band {
                            let zo = zi / edge;
                            if in_other(zo) {
                                acc += fe * other.pdf(zo) / edge.abs() / 2.0;
                            }
                        }
                    }
                }
                acc * dt
            })
            .collect();
        self.install(z, pdf);
        self
    }

    /// Distribution of the quotient of two independent quantities.
    ///
    /// A divisor that can be zero has no finite quotient; the result is
    /// uniform over a sentinel range:
    ///
    /// | divisor | dividend | result |
    /// |---|---|---|
    /// | straddles 0 | any | `[lowest, highest]` |
    /// | any | straddles 0 | `[lowest, highest]` |
    /// | `lb == 0` | `lb >= 0` | `[0, highest]` |
    /// | `lb == 0` | `lb < 0` | `[lowest, 0]` |
    /// | `ub == 0` | `lb >= 0` | `[lowest, 0]` |
    /// | `ub == 0` | `lb < 0` | `[0, highest]` |
    pub fn divide(&mut self, other: &DiscretizedDistribution) -> &mut Self {
        self.detach_model();
        let (lb_t, ub_t) = (self.lower_bound(), self.upper_bound());
        let (lb_o, ub_o) = (other.lower_bound(), other.upper_bound());
        let cfg = *self.config();

        if lb_o <= 0.0 && ub_o >= 0.0 {
            let divisor_straddles = lb_o < 0.0 && ub_o > 0.0;
            let dividend_straddles = lb_t < 0.0 && ub_t > 0.0;
            let positive = (0.0, cfg.highest);
            let negative = (cfg.lowest, 0.0);
            let (lb, ub) = if divisor_straddles || dividend_straddles {
                (cfg.lowest, cfg.highest)
            } else if lb_o == 0.0 {
                if lb_t >= 0.0 {
                    positive
                } else {
                    negative
                }
            } else if lb_t >= 0.0 {
                negative
            } else {
                positive
            };
            self.spread_uniform(lb, ub);
            return self;
        }

        let (lb, ub) = extremes([lb_t / lb_o, lb_t / ub_o, ub_t / lb_o, ub_t / ub_o]);
        if self.settle_degenerate(lb, ub) {
            return self;
        }

        let n = cfg.mult_samples.max(2);
        let z = stats::linspace(lb, ub, n);
        let zo = stats::linspace(lb_o, ub_o, n);
        let ds = (ub_o - lb_o) / (n - 1) as f64;
        let pdf_o = other.pdf_many(&zo);

        let pdf: Vec<f64> = z
            .iter()
            .map(|&zi| {
                let mut acc = 0.0;
                for (&s, &fs) in zo.iter().zip(&pdf_o) {
                    let zt = zi * s;
                    if zt >= lb_t && zt <= ub_t {
                        acc += fs * self.pdf(zt) * s.abs();
                    }
                }
                acc * ds
            })
            .collect();
        self.install(z, pdf);
        self
    }

    /// Installs an equally spaced result grid and its density.
    fn install(&mut self, z: Vec<f64>, pdf: Vec<f64>) {
        let n = z.len();
        let dz = (z[n - 1] - z[0]) / (n - 1) as f64;
        self.replace_tables(z, pdf, dz);
    }

    /// Handles a product or quotient support that is not a proper finite
    /// interval. Returns `true` when the result has been settled.
    fn settle_degenerate(&mut self, lb: f64, ub: f64) -> bool {
        if !spans_finitely(lb, ub) || lb >= ub {
            self.spread_uniform(lb, ub);
            return true;
        }
        false
    }
}

/// Whole steps of size `step` across `width`; at least one.
fn steps_across(width: f64, step: f64) -> usize {
    let k = (width / step).round();
    if k.is_finite() && k >= 1.0 {
        k as usize
    } else {
        1
    }
}

fn extremes(values: [f64; 4]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

// ============================================================================
// Operator sugar
// ============================================================================

impl Neg for DiscretizedDistribution {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.negate();
        self
    }
}

impl Add<f64> for DiscretizedDistribution {
    type Output = Self;

    fn add(mut self, rhs: f64) -> Self {
        self.add_scalar(rhs);
        self
    }
}

impl Sub<f64> for DiscretizedDistribution {
    type Output = Self;

    fn sub(mut self, rhs: f64) -> Self {
        self.subtract_scalar(rhs);
        self
    }
}

impl Mul<f64> for DiscretizedDistribution {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        self.multiply_scalar(rhs);
        self
    }
}

impl Div<f64> for DiscretizedDistribution {
    type Output = Self;

    fn div(mut self, rhs: f64) -> Self {
        self.divide_scalar(rhs);
        self
    }
}

impl Add<&DiscretizedDistribution> for DiscretizedDistribution {
    type Output = Self;

    fn add(mut self, rhs: &DiscretizedDistribution) -> Self {
        DiscretizedDistribution::add(&mut self, rhs);
        self
    }
}

impl Sub<&DiscretizedDistribution> for DiscretizedDistribution {
    type Output = Self;

    fn sub(mut self, rhs: &DiscretizedDistribution) -> Self {
        self.subtract(rhs);
        self
    }
}

impl Mul<&DiscretizedDistribution> for DiscretizedDistribution {
    type Output = Self;

    fn mul(mut self, rhs: &DiscretizedDistribution) -> Self {
        self.multiply(rhs);
        self
    }
}

impl Div<&DiscretizedDistribution> for DiscretizedDistribution {
    type Output = Self;

    fn div(mut self, rhs: &DiscretizedDistribution) -> Self {
        self.divide(rhs);
        self
    }
}

#[cfg(test)]
mod tests {
    // `std::ops::Add` stays out of scope so `d.add(&x)` resolves to the
    // in-place method rather than the consuming operator.
    use crate::config::DistributionConfig;
    use crate::distribution::DiscretizedDistribution;
    use crate::family::DensityModel;

    fn cfg() -> DistributionConfig {
        DistributionConfig::default()
    }

    fn assert_normalized(d: &DiscretizedDistribution) {
        let z = d.grid();
        let pdf = d.density();
        let cdf = d.cumulative();
        assert!(d.lower_bound() < d.upper_bound());
        assert_eq!(z.len(), pdf.len());
        assert_eq!(z[0], d.lower_bound());
        assert_eq!(z[z.len() - 1], d.upper_bound());
        assert!(z.windows(2).all(|w| w[0] < w[1]));
        assert!(pdf.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert_eq!(cdf[0], 0.0);
        assert!((cdf[cdf.len() - 1] - 1.0).abs() < 1e-9);
        assert!(cdf.windows(2).all(|w| w[0] <= w[1] + 1e-15));
    }

    // --- negate ---

    #[test]
    fn test_negate_mirrors() {
        let mut d = DiscretizedDistribution::linear(1.0, 3.0, true, cfg());
        d.negate();
        assert_eq!(d.lower_bound(), -3.0);
        assert_eq!(d.upper_bound(), -1.0);
        assert_eq!(d.model(), &DensityModel::Empirical);
        // ascending ramp becomes descending
        assert!(d.pdf(-2.9) > d.pdf(-1.1));
        assert!((d.mean() + 7.0 / 3.0).abs() < 1e-4);
        assert_normalized(&d);
    }

    #[test]
    fn test_negate_lazy_grid_stays_lazy() {
        let mut d = DiscretizedDistribution::with_bounds(2.0, 5.0, cfg());
        d.negate();
        assert!(!d.has_density());
        assert_eq!(d.lower_bound(), -5.0);
        assert_eq!(d.upper_bound(), -2.0);
    }

    #[test]
    fn test_negate_is_self_inverse() {
        let original = DiscretizedDistribution::linear(-1.0, 4.0, false, cfg());
        let mut d = original.clone();
        d.negate();
        d.negate();
        assert_eq!(d.lower_bound(), original.lower_bound());
        assert_eq!(d.upper_bound(), original.upper_bound());
        for z in original.grid() {
            assert!((d.pdf(z) - original.pdf(z)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_neg_operator() {
        let d = -DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        assert_eq!(d.lower_bound(), -2.0);
        assert_eq!(d.upper_bound(), -1.0);
    }

    // --- reciprocal ---

    #[test]
    fn test_reciprocal_positive_support() {
        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        d.reciprocal();
        assert!((d.lower_bound() - 0.5).abs() < 1e-15);
        assert_eq!(d.upper_bound(), 1.0);
        assert_eq!(d.n_samples(), cfg().mult_samples);
        // density of 1/X is 1/y² on [1/2, 1]; E = ln 2
        assert!((d.mean() - std::f64::consts::LN_2).abs() < 1e-3);
        assert!((d.pdf(0.5) / d.pdf(1.0) - 4.0).abs() < 1e-6);
        assert_normalized(&d);
    }

    #[test]
    fn test_reciprocal_negative_support() {
        let mut d = DiscretizedDistribution::uniform(-4.0, -2.0, cfg());
        d.reciprocal();
        assert!((d.lower_bound() + 0.5).abs() < 1e-15);
        assert!((d.upper_bound() + 0.25).abs() < 1e-15);
        assert_normalized(&d);
    }

    #[test]
    fn test_reciprocal_straddling_zero_spreads_full_range() {
        let mut d = DiscretizedDistribution::uniform(-1.0, 1.0, cfg());
        d.reciprocal();
        assert_eq!(d.lower_bound(), cfg().lowest);
        assert_eq!(d.upper_bound(), cfg().highest);
        let pdf = d.density();
        assert!(pdf.iter().all(|p| *p == pdf[0] && *p > 0.0));
    }

    #[test]
    fn test_reciprocal_touching_zero() {
        let mut d = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        d.reciprocal();
        assert_eq!(d.lower_bound(), 0.0);
        assert_eq!(d.upper_bound(), cfg().highest);

        let mut d = DiscretizedDistribution::uniform(-1.0, 0.0, cfg());
        d.reciprocal();
        assert_eq!(d.lower_bound(), cfg().lowest);
        assert_eq!(d.upper_bound(), 0.0);
    }

    // --- operators on sentinel results ---

    fn full_range() -> DiscretizedDistribution {
        let mut d = DiscretizedDistribution::uniform(-1.0, 1.0, cfg());
        d.reciprocal();
        d
    }

    #[test]
    fn test_operators_after_full_range_stay_finite() {
        let c = cfg();
        let other = DiscretizedDistribution::uniform(1.0, 2.0, c);

        let mut product = full_range();
        product.multiply(&other);
        let mut sum = full_range();
        sum.add(&full_range());
        let mut difference = full_range();
        difference.subtract(&full_range());
        let mut quotient = full_range();
        quotient.divide(&other);
        let mut scaled = full_range();
        scaled.multiply_scalar(3.0);

        for d in [&product, &sum, &difference, &quotient, &scaled] {
            assert_normalized(d);
            assert!(d.lower_bound() >= c.lowest);
            assert!(d.upper_bound() <= c.highest);
            assert!(d.mean().is_finite());
        }
        assert_eq!(product.lower_bound(), c.lowest);
        assert_eq!(product.upper_bound(), c.highest);
        assert_eq!(sum.lower_bound(), c.lowest);
        assert_eq!(sum.upper_bound(), c.highest);
    }

    #[test]
    fn test_sentinel_spread_is_infinitely_uncertain() {
        let d = full_range();
        assert_eq!(d.variance(), f64::INFINITY);
        assert_eq!(d.std(), f64::INFINITY);

        let mut half = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        half.reciprocal();
        assert_eq!(half.std(), f64::INFINITY);

        let mut chained = full_range();
        chained.add(&DiscretizedDistribution::uniform(0.0, 1.0, cfg()));
        assert_eq!(chained.std(), f64::INFINITY);
    }

    // --- scalar operators ---

    #[test]
    fn test_add_scalar_translates() {
        let mut d = DiscretizedDistribution::linear(0.0, 2.0, true, cfg());
        let mean = d.mean();
        let shape = d.density();
        d.add_scalar(10.0);
        assert_eq!(d.lower_bound(), 10.0);
        assert_eq!(d.upper_bound(), 12.0);
        assert!((d.mean() - (mean + 10.0)).abs() < 1e-9);
        for (a, b) in d.density().iter().zip(&shape) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_add_scalar_keeps_lazy_density() {
        let mut d = DiscretizedDistribution::with_bounds(0.0, 1.0, cfg());
        d.add_scalar(1.0);
        assert!(!d.has_density());
        assert_eq!(d.grid(), vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_scalar_round_trip() {
        let original = DiscretizedDistribution::normal(1.5, 0.3, cfg());
        let mut d = original.clone();
        d.add_scalar(3.7).subtract_scalar(3.7);
        assert!((d.lower_bound() - original.lower_bound()).abs() < 1e-12);
        assert!((d.upper_bound() - original.upper_bound()).abs() < 1e-12);
        assert!((d.mean() - original.mean()).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_scalars_ignored() {
        let mut d = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        d.add_scalar(f64::NAN).multiply_scalar(f64::INFINITY);
        assert_eq!(d.lower_bound(), 0.0);
        assert_eq!(d.upper_bound(), 1.0);
    }

    #[test]
    fn test_multiply_scalar_scales() {
        let mut d = DiscretizedDistribution::uniform(1.0, 3.0, cfg());
        d.multiply_scalar(2.5);
        assert_eq!(d.lower_bound(), 2.5);
        assert_eq!(d.upper_bound(), 7.5);
        assert!((d.mean() - 5.0).abs() < 1e-9);
        assert!((d.pdf(5.0) - 0.2).abs() < 1e-9);
        assert_normalized(&d);
    }

    #[test]
    fn test_multiply_scalar_negative_negates() {
        let mut d = DiscretizedDistribution::linear(1.0, 2.0, true, cfg());
        d.multiply_scalar(-2.0);
        assert_eq!(d.lower_bound(), -4.0);
        assert_eq!(d.upper_bound(), -2.0);
        assert!(d.pdf(-3.9) > d.pdf(-2.1));
    }

    #[test]
    fn test_multiply_scalar_zero_collapses() {
        let mut d = DiscretizedDistribution::normal(50.0, 4.0, cfg());
        d.multiply_scalar(0.0);
        let mi = cfg().min_interval;
        assert!(d.lower_bound().abs() <= mi);
        assert!(d.upper_bound().abs() <= mi);
        assert_eq!(d.n_samples(), cfg().min_samples);
        assert_normalized(&d);
    }

    #[test]
    fn test_divide_scalar() {
        let mut d = DiscretizedDistribution::uniform(2.0, 4.0, cfg());
        d.divide_scalar(2.0);
        assert_eq!(d.lower_bound(), 1.0);
        assert_eq!(d.upper_bound(), 2.0);

        let mut d = DiscretizedDistribution::uniform(2.0, 4.0, cfg());
        d.divide_scalar(-2.0);
        assert_eq!(d.lower_bound(), -2.0);
        assert_eq!(d.upper_bound(), -1.0);
    }

    #[test]
    fn test_divide_scalar_zero_is_noop() {
        let mut d = DiscretizedDistribution::linear(2.0, 4.0, false, cfg());
        let (grid, pdf) = (d.grid(), d.density());
        d.divide_scalar(0.0);
        assert_eq!(d.lower_bound(), 2.0);
        assert_eq!(d.upper_bound(), 4.0);
        assert_eq!(d.grid(), grid);
        assert_eq!(d.density(), pdf);
    }

    #[test]
    fn test_divide_scalar_tiny_divisor_still_divides() {
        let c = cfg();
        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, c);
        d.divide_scalar(1e-320);
        assert_eq!(d.lower_bound(), c.highest);
        assert!(d.upper_bound() > c.highest);
        assert_normalized(&d);

        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, c);
        d.divide_scalar(-1e-320);
        assert_eq!(d.lower_bound(), c.lowest);
        assert!(d.upper_bound() < c.lowest / 2.0);
        assert_normalized(&d);

        // 1/s still representable: plain scaling
        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, c);
        d.divide_scalar(1e-300);
        assert!((d.lower_bound() / 1e300 - 1.0).abs() < 1e-12);
        assert!((d.upper_bound() / 2e300 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scalar_operator_sugar() {
        let d = (DiscretizedDistribution::uniform(0.0, 1.0, cfg()) * 4.0 + 1.0) / 2.0 - 0.5;
        assert!((d.lower_bound() - 0.0).abs() < 1e-12);
        assert!((d.upper_bound() - 2.0).abs() < 1e-12);
    }

    // --- convolution ---

    #[test]
    fn test_add_two_uniforms_is_triangular() {
        let mut d = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        let other = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        d.add(&other);
        assert_eq!(d.lower_bound(), 0.0);
        assert_eq!(d.upper_bound(), 2.0);
        assert_eq!(d.n_samples(), 2 * cfg().conv_samples + 1);
        assert!((d.mean() - 1.0).abs() < 1e-6);
        assert!((d.variance() - 1.0 / 6.0).abs() < 1e-3);
        assert!((d.pdf(1.0) - 1.0).abs() < 1e-2);
        assert_normalized(&d);
    }

    #[test]
    fn test_add_unequal_widths() {
        let mut d = DiscretizedDistribution::uniform(0.0, 4.0, cfg());
        let other = DiscretizedDistribution::normal(10.0, 0.1, cfg());
        d.add(&other);
        assert!((d.lower_bound() - 9.4).abs() < 1e-9);
        assert!((d.upper_bound() - 14.6).abs() < 1e-9);
        assert!((d.mean() - 12.0).abs() < 1e-2);
        assert_normalized(&d);
    }

    #[test]
    fn test_add_leaves_other_untouched() {
        let mut d = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        let other = DiscretizedDistribution::linear(0.0, 1.0, true, cfg());
        let before = other.density();
        d.add(&other);
        assert_eq!(other.density(), before);
        assert_eq!(other.model(), &DensityModel::Linear { ascending: true });
    }

    #[test]
    fn test_subtract_distribution() {
        let mut d = DiscretizedDistribution::uniform(2.0, 3.0, cfg());
        let other = DiscretizedDistribution::uniform(0.0, 1.0, cfg());
        d.subtract(&other);
        assert!((d.lower_bound() - 1.0).abs() < 1e-12);
        assert!((d.upper_bound() - 3.0).abs() < 1e-12);
        assert!((d.mean() - 2.0).abs() < 1e-6);
        assert_eq!(other.lower_bound(), 0.0);
        assert_eq!(other.upper_bound(), 1.0);
    }

    // --- product & quotient ---

    #[test]
    fn test_multiply_positive_operands() {
        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        let other = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        d.multiply(&other);
        assert!((d.lower_bound() - 1.0).abs() < 1e-15);
        assert!((d.upper_bound() - 4.0).abs() < 1e-15);
        assert_eq!(d.n_samples(), cfg().mult_samples);
        assert!((d.mean() - 2.25).abs() < 0.05, "mean {}", d.mean());
        assert_normalized(&d);
    }

    #[test]
    fn test_multiply_mixed_signs_is_symmetric() {
        let mut d = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        let other = DiscretizedDistribution::uniform(-1.0, 1.0, cfg());
        d.multiply(&other);
        assert!((d.lower_bound() + 2.0).abs() < 1e-15);
        assert!((d.upper_bound() - 2.0).abs() < 1e-15);
        assert!(d.mean().abs() < 1e-2);
        assert_normalized(&d);
    }

    #[test]
    fn test_multiply_left_operand_straddling_zero() {
        let mut d = DiscretizedDistribution::uniform(-1.0, 1.0, cfg());
        let other = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        d.multiply(&other);
        assert!((d.lower_bound() + 2.0).abs() < 1e-15);
        assert!((d.upper_bound() - 2.0).abs() < 1e-15);
        assert_normalized(&d);
    }

    #[test]
    fn test_divide_positive_operands() {
        let mut d = DiscretizedDistribution::uniform(2.0, 4.0, cfg());
        let other = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        d.divide(&other);
        assert!((d.lower_bound() - 1.0).abs() < 1e-15);
        assert!((d.upper_bound() - 4.0).abs() < 1e-15);
        // E[X]·E[1/Y] = 3 ln 2
        let expected = 3.0 * std::f64::consts::LN_2;
        assert!((d.mean() - expected).abs() < 0.05, "mean {}", d.mean());
        assert_normalized(&d);
    }

    #[test]
    fn test_divide_by_negative_operand() {
        let mut d = DiscretizedDistribution::uniform(2.0, 4.0, cfg());
        let other = DiscretizedDistribution::uniform(-2.0, -1.0, cfg());
        d.divide(&other);
        assert!((d.lower_bound() + 4.0).abs() < 1e-15);
        assert!((d.upper_bound() + 1.0).abs() < 1e-15);
        assert_normalized(&d);
    }

    #[test]
    fn test_divide_sentinel_policy() {
        let c = cfg();
        let (lo, hi) = (c.lowest, c.highest);
        let cases = [
            // (dividend, divisor, expected)
            ((1.0, 2.0), (-1.0, 1.0), (lo, hi)),
            ((-1.0, 2.0), (0.0, 1.0), (lo, hi)),
            ((1.0, 2.0), (0.0, 1.0), (0.0, hi)),
            ((-2.0, -1.0), (0.0, 1.0), (lo, 0.0)),
            ((1.0, 2.0), (-1.0, 0.0), (lo, 0.0)),
            ((-2.0, -1.0), (-1.0, 0.0), (0.0, hi)),
        ];
        for ((a, b), (p, q), (elb, eub)) in cases {
            let mut d = DiscretizedDistribution::uniform(a, b, c);
            let other = DiscretizedDistribution::uniform(p, q, c);
            d.divide(&other);
            assert_eq!(d.lower_bound(), elb, "[{a}, {b}] / [{p}, {q}]");
            assert_eq!(d.upper_bound(), eub, "[{a}, {b}] / [{p}, {q}]");
            let pdf = d.density();
            assert!(pdf.iter().all(|v| *v == pdf[0]));
        }
    }

    #[test]
    fn test_distribution_operator_sugar() {
        let a = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        let b = DiscretizedDistribution::uniform(1.0, 2.0, cfg());
        let sum = a.clone() + &b;
        assert!((sum.lower_bound() - 2.0).abs() < 1e-15);
        let diff = a.clone() - &b;
        assert!((diff.upper_bound() - 1.0).abs() < 1e-15);
        let prod = a.clone() * &b;
        assert!((prod.upper_bound() - 4.0).abs() < 1e-15);
        let quot = a / &b;
        assert!((quot.lower_bound() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_operations_detach_models() {
        let mut d = DiscretizedDistribution::chi_squared(3.0, cfg());
        d.add_scalar(1.0);
        assert_eq!(d.model(), &DensityModel::Empirical);
        assert!(d.parameters().is_empty());
    }
}
