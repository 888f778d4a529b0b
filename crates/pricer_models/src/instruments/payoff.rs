//! Basket payoffs.
//!
//! Two shapes are supported:
//! - Max-of-basket call: `max(max_i S_i - K, 0)`, a plain call when `d = 1`
//! - Geometric-basket put: `max(K - (prod_i S_i)^(1/d), 0)`
//!
//! The geometric mean is computed in log space with prices floored at
//! [`LOG_FLOOR`].

use std::fmt;
use std::str::FromStr;

use crate::models::StateBatch;

use super::error::PayoffError;

/// Lower bound applied to prices before taking logarithms.
pub const LOG_FLOOR: f64 = 1e-12;

/// Shape of a basket payoff.
///
/// # Examples
/// ```
/// use pricer_models::instruments::PayoffKind;
///
/// let kind: PayoffKind = "geometric-basket-put".parse().unwrap();
/// assert_eq!(kind, PayoffKind::GeometricPut);
/// assert!("straddle".parse::<PayoffKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayoffKind {
    /// Call on the best-performing asset
    MaxCall,
    /// Put on the geometric mean of the basket
    GeometricPut,
}

impl PayoffKind {
    /// Canonical command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffKind::MaxCall => "max-call",
            PayoffKind::GeometricPut => "geo-put",
        }
    }
}

impl fmt::Display for PayoffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffKind {
    type Err = PayoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max-call" | "max_call" | "max-of-basket-call" => Ok(PayoffKind::MaxCall),
            "geo-put" | "geo_put" | "geometric-basket-put" => Ok(PayoffKind::GeometricPut),
            _ => Err(PayoffError::UnknownKind {
                name: s.to_string(),
            }),
        }
    }
}

/// Basket payoff with a fixed strike.
///
/// # Examples
/// ```
/// use pricer_models::instruments::{BasketPayoff, PayoffKind};
///
/// let call = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
/// assert_eq!(call.evaluate_row(&[90.0, 115.0]), 15.0);
///
/// let put = BasketPayoff::new(PayoffKind::GeometricPut, 100.0).unwrap();
/// assert!((put.evaluate_row(&[80.0, 80.0]) - 20.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketPayoff {
    kind: PayoffKind,
    strike: f64,
}

impl BasketPayoff {
    /// Creates a payoff.
    ///
    /// # Errors
    /// `PayoffError::InvalidStrike` if the strike is negative or not finite.
    pub fn new(kind: PayoffKind, strike: f64) -> Result<Self, PayoffError> {
        Self::check_strike(strike)?;
        Ok(Self { kind, strike })
    }

    /// Accepts any finite, non-negative strike.
    ///
    /// # Errors
    /// `PayoffError::InvalidStrike` otherwise.
    pub fn check_strike(strike: f64) -> Result<(), PayoffError> {
        if !(strike >= 0.0 && strike.is_finite()) {
            return Err(PayoffError::InvalidStrike { strike });
        }
        Ok(())
    }

    /// Payoff shape.
    #[inline]
    pub fn kind(&self) -> PayoffKind {
        self.kind
    }

    /// Strike `K`.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Payoff of a single state.
    #[inline]
    pub fn evaluate_row(&self, state: &[f64]) -> f64 {
        match self.kind {
            PayoffKind::MaxCall => {
                let best = state.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (best - self.strike).max(0.0)
            }
            PayoffKind::GeometricPut => {
                let mean_log = state.iter().map(|&s| s.max(LOG_FLOOR).ln()).sum::<f64>()
                    / state.len() as f64;
                (self.strike - mean_log.exp()).max(0.0)
            }
        }
    }

    /// Payoff of every state in the batch.
    pub fn evaluate(&self, states: &StateBatch) -> Vec<f64> {
        states.rows().map(|row| self.evaluate_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_aliases() {
        for name in ["max-call", "max_call", "max-of-basket-call", " MAX-CALL "] {
            assert_eq!(name.parse::<PayoffKind>().unwrap(), PayoffKind::MaxCall);
        }
        for name in ["geo-put", "geo_put", "geometric-basket-put"] {
            assert_eq!(name.parse::<PayoffKind>().unwrap(), PayoffKind::GeometricPut);
        }
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = "asian-call".parse::<PayoffKind>().unwrap_err();
        assert_eq!(
            err,
            PayoffError::UnknownKind {
                name: "asian-call".to_string()
            }
        );
        assert!(err.to_string().contains("asian-call"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in [PayoffKind::MaxCall, PayoffKind::GeometricPut] {
            assert_eq!(kind.to_string().parse::<PayoffKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_invalid_strike() {
        assert!(BasketPayoff::new(PayoffKind::MaxCall, -1.0).is_err());
        assert!(BasketPayoff::new(PayoffKind::MaxCall, f64::NAN).is_err());
        assert!(BasketPayoff::new(PayoffKind::MaxCall, 0.0).is_ok());
    }

    #[test]
    fn test_max_call_single_asset_is_plain_call() {
        let payoff = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
        assert_eq!(payoff.evaluate_row(&[110.0]), 10.0);
        assert_eq!(payoff.evaluate_row(&[100.0]), 0.0);
        assert_eq!(payoff.evaluate_row(&[90.0]), 0.0);
    }

    #[test]
    fn test_geometric_put() {
        let payoff = BasketPayoff::new(PayoffKind::GeometricPut, 100.0).unwrap();
        // sqrt(50 * 200) = 100
        assert_relative_eq!(payoff.evaluate_row(&[50.0, 200.0]), 0.0, epsilon = 1e-10);
        // cbrt(64 * 64 * 64) = 64
        assert_relative_eq!(payoff.evaluate_row(&[64.0, 64.0, 64.0]), 36.0, epsilon = 1e-10);
    }

    #[test]
    fn test_geometric_put_floors_non_positive_prices() {
        let payoff = BasketPayoff::new(PayoffKind::GeometricPut, 100.0).unwrap();
        let value = payoff.evaluate_row(&[0.0, 100.0]);
        assert!(value.is_finite());
        assert_relative_eq!(value, 100.0 - (LOG_FLOOR * 100.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_batch() {
        let payoff = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
        let batch = StateBatch::from_rows(&[[90.0, 120.0], [80.0, 70.0]]);
        assert_eq!(payoff.evaluate(&batch), vec![20.0, 0.0]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_payoff_non_negative_and_finite(
                prices in prop::collection::vec(0.0..1000.0f64, 1..6),
                strike in 0.0..300.0f64,
                geometric in any::<bool>(),
            ) {
                let kind = if geometric { PayoffKind::GeometricPut } else { PayoffKind::MaxCall };
                let value = BasketPayoff::new(kind, strike).unwrap().evaluate_row(&prices);
                prop_assert!(value >= 0.0);
                prop_assert!(value.is_finite());
            }
        }
    }
}
