//! Sample statistics for Monte Carlo estimators.
//!
//! All functions operate on `&[f64]` samples. Variances use the unbiased
//! (`n - 1`) normalisation; a single sample has zero spread by convention.

use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean. Returns `NaN` for an empty slice.
#[inline]
pub fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Unbiased sample variance (`ddof = 1`). Zero when fewer than two samples.
pub fn sample_variance(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(samples);
    samples.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Unbiased sample standard deviation.
#[inline]
pub fn sample_std(samples: &[f64]) -> f64 {
    sample_variance(samples).sqrt()
}

/// Standard error of the mean: `sample_std / sqrt(n)`.
///
/// Zero for fewer than two samples.
///
/// # Examples
///
/// ```
/// use pricer_core::math::statistics::standard_error;
///
/// assert_eq!(standard_error(&[3.0]), 0.0);
/// assert!((standard_error(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
/// ```
pub fn standard_error(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    sample_std(samples) / (n as f64).sqrt()
}

/// Standard normal quantile `Φ⁻¹(p)`.
///
/// Returns `NaN` when `p` lies outside `(0, 1)`.
pub fn normal_quantile(p: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(p))
        .unwrap_or(f64::NAN)
}
