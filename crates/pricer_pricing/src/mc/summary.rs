//! Aggregation of repeated time-zero estimates.

use pricer_core::math::statistics::{mean, normal_quantile, standard_error};

/// Two-sided confidence level of the reported interval.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Mean, standard error and 95% confidence interval of repeated estimates.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::Summary;
///
/// let summary = Summary::from_estimates(&[10.0, 12.0]).unwrap();
/// assert_eq!(summary.mean, 11.0);
/// assert!((summary.std_error - 1.0).abs() < 1e-12);
/// assert!(summary.ci_low < 11.0 && summary.ci_high > 11.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    /// Mean of the estimates
    pub mean: f64,
    /// Sample standard deviation (ddof = 1) divided by `sqrt(n)`; 0 for one estimate
    pub std_error: f64,
    /// Lower bound of the 95% confidence interval
    pub ci_low: f64,
    /// Upper bound of the 95% confidence interval
    pub ci_high: f64,
    /// Number of estimates aggregated
    pub n: usize,
}

impl Summary {
    /// Aggregates estimates; `None` when the slice is empty.
    pub fn from_estimates(estimates: &[f64]) -> Option<Self> {
        if estimates.is_empty() {
            return None;
        }
        let m = mean(estimates);
        let se = standard_error(estimates);
        let z = normal_quantile(0.5 + CONFIDENCE_LEVEL / 2.0);
        Some(Self {
            mean: m,
            std_error: se,
            ci_low: m - z * se,
            ci_high: m + z * se,
            n: estimates.len(),
        })
    }

    /// Half-width of the confidence interval.
    #[inline]
    pub fn half_width(&self) -> f64 {
        0.5 * (self.ci_high - self.ci_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_estimate_collapses() {
        let s = Summary::from_estimates(&[4.2]).unwrap();
        assert_eq!(s.mean, 4.2);
        assert_eq!(s.std_error, 0.0);
        assert_eq!(s.ci_low, 4.2);
        assert_eq!(s.ci_high, 4.2);
        assert_eq!(s.n, 1);
    }

    #[test]
    fn test_closed_form() {
        // mean 2.5, sample std sqrt(5/3), SE sqrt(5/3)/2
        let s = Summary::from_estimates(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let se = (5.0_f64 / 3.0).sqrt() / 2.0;
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.std_error, se, epsilon = 1e-12);
        assert_relative_eq!(s.ci_low, 2.5 - 1.959_963_984_540_054 * se, epsilon = 1e-9);
        assert_relative_eq!(s.ci_high, 2.5 + 1.959_963_984_540_054 * se, epsilon = 1e-9);
        assert_relative_eq!(s.half_width(), 1.959_963_984_540_054 * se, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(Summary::from_estimates(&[]).is_none());
    }
}
