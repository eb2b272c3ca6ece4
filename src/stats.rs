//! Numerical kernels behind the distribution engine.
//!
//! All integrals are trapezoidal over an arbitrary (not necessarily
//! uniform) grid and accumulate with Neumaier-compensated summation, so
//! the error does not grow with the number of grid points.
//!
//! # Algorithms
//!
//! - **Summation**: Kahan–Babuška (Neumaier) compensation.
//!   Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
//! - **Integration**: composite trapezoidal rule.
//! - **Convolution**: direct O(n·m) discrete convolution.

/// Neumaier-compensated sum.
///
/// Improves on classic Kahan summation by also handling the case where
/// the addend is larger in magnitude than the running sum.
///
/// # Complexity
/// Time: O(n), Space: O(1)
///
/// # Examples
/// ```
/// use u_empirical::stats::kahan_sum;
/// let v = [1.0, 1e100, 1.0, -1e100];
/// assert_eq!(kahan_sum(&v), 2.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut acc = Compensated::default();
    for &x in data {
        acc.add(x);
    }
    acc.total()
}

/// Running Neumaier accumulator.
#[derive(Debug, Clone, Copy, Default)]
struct Compensated {
    sum: f64,
    c: f64,
}

impl Compensated {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.c += (self.sum - t) + x;
        } else {
            self.c += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.c
    }
}

/// Trapezoidal integral of `y(x)` over the grid `x`.
///
/// Returns 0 for fewer than two points. Extra elements of the longer
/// slice are ignored.
///
/// # Examples
/// ```
/// use u_empirical::stats::trapezoid;
/// let x = [0.0, 1.0, 2.0];
/// let y = [0.0, 1.0, 2.0];
/// assert!((trapezoid(&x, &y) - 2.0).abs() < 1e-15);
/// ```
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    trapezoid_weighted(x, y, |_| 1.0)
}

/// Trapezoidal integral of `w(x)·y(x)` over the grid `x`.
///
/// With `w(z) = z` this is the first moment of a density, with
/// `w(z) = z²` the second.
pub fn trapezoid_weighted(x: &[f64], y: &[f64], w: impl Fn(f64) -> f64) -> f64 {
    let n = x.len().min(y.len());
    let mut acc = Compensated::default();
    for i in 1..n {
        let cur = w(x[i - 1]) * y[i - 1];
        let next = w(x[i]) * y[i];
        acc.add((cur + next) / 2.0 * (x[i] - x[i - 1]));
    }
    acc.total()
}

/// Running trapezoidal integral; the first element is always 0.
///
/// # Examples
/// ```
/// use u_empirical::stats::cumulative_trapezoid;
/// let c = cumulative_trapezoid(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0]);
/// assert_eq!(c, vec![0.0, 1.0, 2.0]);
/// ```
pub fn cumulative_trapezoid(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    let mut acc = Compensated::default();
    out.push(0.0);
    for i in 1..n {
        acc.add((y[i - 1] + y[i]) / 2.0 * (x[i] - x[i - 1]));
        out.push(acc.total());
    }
    out
}

/// Full discrete convolution of two sequences (length `a.len() + b.len() − 1`).
///
/// Returns an empty vector if either input is empty.
///
/// # Examples
/// ```
/// use u_empirical::stats::convolve;
/// assert_eq!(convolve(&[1.0, 1.0], &[1.0, 1.0]), vec![1.0, 2.0, 1.0]);
/// ```
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0.0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// `n` equally spaced points from `lb` to `ub` inclusive.
///
/// Points are computed as `lb + i·step` (no accumulated drift) and the
/// last point is pinned to `ub` exactly. `n < 2` yields `[lb]` or nothing.
/// When `ub − lb` overflows, the step is split into `ub/(n−1)` and
/// `lb/(n−1)` so every point stays finite.
///
/// # Examples
/// ```
/// use u_empirical::stats::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn linspace(lb: f64, ub: f64, n: usize) -> Vec<f64> {
    match n {
        0 => return Vec::new(),
        1 => return vec![lb],
        _ => {}
    }
    let m = (n - 1) as f64;
    let step = (ub - lb) / m;
    let mut out: Vec<f64> = if step.is_finite() {
        (0..n).map(|i| lb + i as f64 * step).collect()
    } else {
        let (a, b) = (lb / m, ub / m);
        (0..n)
            .map(|i| {
                let k = i as f64;
                (lb + k * b) - k * a
            })
            .collect()
    };
    out[n - 1] = ub;
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn convolution_preserves_total_mass(
            a in proptest::collection::vec(0.0_f64..10.0, 1..40),
            b in proptest::collection::vec(0.0_f64..10.0, 1..40),
        ) {
            let c = convolve(&a, &b);
            prop_assert_eq!(c.len(), a.len() + b.len() - 1);
            let expected = kahan_sum(&a) * kahan_sum(&b);
            prop_assert!((kahan_sum(&c) - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn cumulative_of_nonnegative_is_monotone(
            y in proptest::collection::vec(0.0_f64..5.0, 2..60),
        ) {
            let x = linspace(-3.0, 7.0, y.len());
            let c = cumulative_trapezoid(&x, &y);
            prop_assert!(c.windows(2).all(|w| w[0] <= w[1] + 1e-12));
        }

        #[test]
        fn linspace_is_strictly_increasing(
            lb in -1e6_f64..1e6,
            width in 1e-3_f64..1e6,
            n in 2_usize..500,
        ) {
            let v = linspace(lb, lb + width, n);
            prop_assert_eq!(v.len(), n);
            prop_assert_eq!(v[0], lb);
            prop_assert_eq!(v[n - 1], lb + width);
            prop_assert!(v.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
