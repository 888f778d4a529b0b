//! Value surfaces of a two-asset estimator chain on a regular grid.
//!
//! Panels are taken at dates `{0, 2, 4, 6, 8}` that precede maturity, plus
//! the payoff at maturity labelled `"T"`.

use pricer_models::models::StateBatch;
use pricer_models::regression::Predictor;

use super::value_fn::ValueChain;

/// Dates at which fitted estimators are sampled.
pub const PANEL_DATES: [usize; 5] = [0, 2, 4, 6, 8];

/// Label of the maturity panel.
pub const TERMINAL_LABEL: &str = "T";

/// Square grid `[lo, hi]^2` with `points` nodes per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGrid {
    /// Lower bound of both axes
    pub lo: f64,
    /// Upper bound of both axes
    pub hi: f64,
    /// Nodes per axis
    pub points: usize,
}

impl Default for SurfaceGrid {
    fn default() -> Self {
        Self {
            lo: 50.0,
            hi: 150.0,
            points: 30,
        }
    }
}

impl SurfaceGrid {
    /// Axis nodes, evenly spaced and including both bounds.
    pub fn axis(&self) -> Vec<f64> {
        match self.points {
            0 => Vec::new(),
            1 => vec![self.lo],
            n => {
                let step = (self.hi - self.lo) / (n - 1) as f64;
                (0..n).map(|i| self.lo + step * i as f64).collect()
            }
        }
    }

    /// All grid states, first coordinate varying slowest.
    pub fn states(&self) -> StateBatch {
        let axis = self.axis();
        let mut data = Vec::with_capacity(2 * axis.len() * axis.len());
        for &x1 in &axis {
            for &x2 in &axis {
                data.push(x1);
                data.push(x2);
            }
        }
        StateBatch::from_vec(data, 2)
    }
}

/// One grid node of a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfacePoint {
    /// First asset price
    pub x1: f64,
    /// Second asset price
    pub x2: f64,
    /// Estimated value
    pub value: f64,
}

/// Estimator values over a grid at one date.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSurface {
    /// Date index, or `"T"` for the payoff at maturity
    pub label: String,
    /// Grid nodes in grid order
    pub points: Vec<SurfacePoint>,
}

/// Panel dates present in a chain with `n_exercise` dates.
pub fn panel_dates(n_exercise: usize) -> Vec<usize> {
    PANEL_DATES
        .iter()
        .copied()
        .filter(|&t| t < n_exercise)
        .collect()
}

/// Surfaces of a two-asset chain at the panel dates plus maturity.
///
/// Returns an empty list unless the grid is non-empty.
pub fn value_surfaces<P: Predictor>(chain: &ValueChain<P>, grid: &SurfaceGrid) -> Vec<ValueSurface> {
    let states = grid.states();
    if states.is_empty() {
        return Vec::new();
    }

    let surface = |label: String, values: Vec<f64>| ValueSurface {
        label,
        points: states
            .rows()
            .zip(values)
            .map(|(row, value)| SurfacePoint {
                x1: row[0],
                x2: row[1],
                value,
            })
            .collect(),
    };

    let mut surfaces: Vec<ValueSurface> = panel_dates(chain.n_exercise())
        .into_iter()
        .filter_map(|t| chain.get(t).map(|v| surface(t.to_string(), v.evaluate(&states))))
        .collect();
    surfaces.push(surface(
        TERMINAL_LABEL.to_string(),
        chain.terminal().evaluate(&states),
    ));
    surfaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::instruments::{BasketPayoff, PayoffKind};
    use pricer_models::regression::Hyperparameters;

    struct Sum;

    impl Predictor for Sum {
        fn predict(&self, x: &StateBatch) -> Vec<f64> {
            x.rows().map(|r| r.iter().sum()).collect()
        }
    }

    #[test]
    fn test_axis_includes_bounds() {
        let axis = SurfaceGrid::default().axis();
        assert_eq!(axis.len(), 30);
        assert_eq!(axis[0], 50.0);
        assert!((axis[29] - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_states_first_coordinate_slowest() {
        let grid = SurfaceGrid {
            lo: 0.0,
            hi: 1.0,
            points: 2,
        };
        assert_eq!(grid.states().as_slice(), &[0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_panel_dates() {
        assert_eq!(panel_dates(9), vec![0, 2, 4, 6, 8]);
        assert_eq!(panel_dates(3), vec![0, 2]);
        assert_eq!(panel_dates(1), vec![0]);
    }

    #[test]
    fn test_value_surfaces_labels_and_values() {
        let payoff = BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap();
        let mut chain = ValueChain::new(payoff, 3);
        for _ in 0..3 {
            chain.push_fitted(Sum, Hyperparameters::new(0.0, 1.0));
        }

        let grid = SurfaceGrid {
            lo: 90.0,
            hi: 110.0,
            points: 3,
        };
        let surfaces = value_surfaces(&chain, &grid);

        let labels: Vec<&str> = surfaces.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "2", "T"]);
        assert_eq!(surfaces[0].points.len(), 9);
        assert_eq!(surfaces[0].points[8].value, 220.0);
        assert_eq!(surfaces[2].points[8].value, 10.0);
        assert_eq!(surfaces[2].points[0].value, 0.0);
    }
}
