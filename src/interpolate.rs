//! Piecewise-linear interpolation and the cache cell that holds it.
//!
//! A distribution keeps three interpolators (density, cumulative and
//! quantile) derived from its arrays. Each lives in a [`Cached`] cell that
//! is either [`Cached::Stale`] or [`Cached::Fresh`]; any mutation of the
//! backing arrays moves it back to `Stale` and the next query rebuilds it.

/// Linear interpolator over paired `(x, y)` samples.
///
/// `x` must be non-decreasing. Repeated abscissae are allowed (a flat
/// stretch of a cumulative distribution turns into repeated `x` values for
/// the quantile interpolator); a query landing on such a stretch returns
/// the `y` of its left end.
///
/// Queries outside `[x₀, xₙ₋₁]` extrapolate from the nearest segment; the
/// distribution clamps before it ever asks.
///
/// # Examples
/// ```
/// use u_empirical::interpolate::LinearInterpolator;
/// let li = LinearInterpolator::new(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0]);
/// assert!((li.interpolate(0.5) - 5.0).abs() < 1e-12);
/// assert!((li.interpolate(2.0) - 20.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    /// Builds an interpolator from paired samples.
    ///
    /// Extra elements of the longer vector are ignored.
    pub fn new(mut x: Vec<f64>, mut y: Vec<f64>) -> Self {
        debug_assert!(
            x.windows(2).all(|w| w[0] <= w[1]),
            "interpolator abscissae must be non-decreasing"
        );
        let n = x.len().min(y.len());
        x.truncate(n);
        y.truncate(n);
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Interpolates `y` at `xq`.
    ///
    /// Returns `NaN` for an empty interpolator and the single `y` value for
    /// a one-point interpolator.
    ///
    /// # Complexity
    /// O(log n) via binary search.
    pub fn interpolate(&self, xq: f64) -> f64 {
        let n = self.x.len();
        match n {
            0 => return f64::NAN,
            1 => return self.y[0],
            _ => {}
        }

        // index of the left end of the bracketing segment
        let j = self
            .x
            .partition_point(|&v| v <= xq)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.x[j], self.x[j + 1]);
        let (y0, y1) = (self.y[j], self.y[j + 1]);
        if x1 == x0 {
            return y0;
        }
        y0 + (xq - x0) / (x1 - x0) * (y1 - y0)
    }
}

/// Lazily rebuilt derived value.
#[derive(Debug, Clone)]
pub enum Cached<T> {
    /// Backing data changed since the last build, or nothing was built yet.
    Stale,
    /// Built from the current backing data.
    Fresh(T),
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Cached::Stale
    }
}

impl<T> Cached<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Cached::Fresh(_))
    }

    /// Drops the derived value; the next access rebuilds it.
    pub fn invalidate(&mut self) {
        *self = Cached::Stale;
    }

    /// Returns the cached value, rebuilding it first when stale.
    pub fn get_or_rebuild(&mut self, build: impl FnOnce() -> T) -> &T {
        if !self.is_fresh() {
            *self = Cached::Fresh(build());
        }
        match self {
            Cached::Fresh(value) => value,
            Cached::Stale => unreachable!("cache cell rebuilt above"),
        }
    }
}
