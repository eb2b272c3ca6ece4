//! Weighted mixtures of distributions.
//!
//! A mixture samples every component on the union of their grids and adds
//! the ratio-weighted densities. Where a component's support ends inside
//! the mixture's support, an extra point just past the edge carries its
//! density down to zero, so gaps between components hold no mass.

use crate::distribution::DiscretizedDistribution;
use crate::error::{DistributionError, Result};

/// Relative offset of the points placed just outside a component edge.
const EDGE_OFFSET: f64 = 1e-9;

impl DiscretizedDistribution {
    /// Mixture of `components`, each weighted by its ratio.
    ///
    /// Ratios need not sum to one; the result is renormalized. Negative
    /// ratios count as zero. The result uses the first component's config
    /// and is empirical.
    ///
    /// # Errors
    /// Returns [`DistributionError::Domain`] if `components` is empty, a
    /// ratio is not finite, or no ratio is positive.
    ///
    /// # Examples
    /// ```
    /// use u_empirical::DiscretizedDistribution;
    /// let cfg = Default::default();
    /// let low = DiscretizedDistribution::uniform(0.0, 1.0, cfg);
    /// let high = DiscretizedDistribution::uniform(2.0, 3.0, cfg);
    /// let d = DiscretizedDistribution::merged(&[(&low, 1.0), (&high, 3.0)]).unwrap();
    /// assert!((d.cdf(1.5) - 0.25).abs() < 1e-6);
    /// assert_eq!(d.pdf(1.5), 0.0);
    /// ```
    pub fn merged(components: &[(&DiscretizedDistribution, f64)]) -> Result<Self> {
        let Some(&(first, _)) = components.first() else {
            return Err(DistributionError::Domain(
                "a mixture needs at least one component".into(),
            ));
        };
        if let Some(&(_, ratio)) = components.iter().find(|(_, r)| !r.is_finite()) {
            return Err(DistributionError::Domain(format!(
                "mixture ratios must be finite, got {ratio}"
            )));
        }
        if components.iter().any(|&(_, r)| r < 0.0) {
            tracing::debug!("negative mixture ratios count as zero");
        }
        let weighted: Vec<(&DiscretizedDistribution, f64)> = components
            .iter()
            .copied()
            .filter(|&(_, r)| r > 0.0)
            .collect();
        if weighted.is_empty() {
            return Err(DistributionError::Domain(
                "no mixture component has a positive ratio".into(),
            ));
        }

        let lb = weighted
            .iter()
            .map(|(d, _)| d.lower_bound())
            .fold(f64::INFINITY, f64::min);
        let ub = weighted
            .iter()
            .map(|(d, _)| d.upper_bound())
            .fold(f64::NEG_INFINITY, f64::max);

        let mut z: Vec<f64> = Vec::new();
        for (d, _) in &weighted {
            z.extend(d.grid());
            let offset = (d.upper_bound() - d.lower_bound()) * EDGE_OFFSET;
            for edge in [d.lower_bound() - offset, d.upper_bound() + offset] {
                if edge > lb && edge < ub {
                    z.push(edge);
                }
            }
        }
        z.sort_by(f64::total_cmp);
        z.dedup();

        let pdf: Vec<f64> = z
            .iter()
            .map(|&v| weighted.iter().map(|(d, r)| r * d.pdf(v)).sum())
            .collect();
        tracing::trace!(
            components = weighted.len(),
            points = z.len(),
            "merged mixture grid"
        );

        let mut out = Self::new(*first.config());
        let dz = (ub - lb) / (z.len() - 1) as f64;
        out.replace_tables(z, pdf, dz);
        Ok(out)
    }
}
