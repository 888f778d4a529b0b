//! Value-function estimators and the chain built by backward induction.
//!
//! At maturity the estimator is exactly the payoff; at every earlier date it
//! is the prediction of the model fitted at that date. The chain is an
//! explicit vector indexed by exercise date.

use pricer_models::instruments::BasketPayoff;
use pricer_models::models::StateBatch;
use pricer_models::regression::{Hyperparameters, Predictor};

/// Value-function estimator at one exercise date.
#[derive(Debug, Clone)]
pub enum ValueFunction<P> {
    /// Exact payoff at maturity.
    Terminal(BasketPayoff),
    /// Regression prediction at an earlier date.
    Fitted {
        /// Fitted model
        model: P,
        /// Hyperparameters the model was fitted with
        hyperparameters: Hyperparameters,
    },
}

impl<P: Predictor> ValueFunction<P> {
    /// Estimated value of every state in the batch.
    pub fn evaluate(&self, states: &StateBatch) -> Vec<f64> {
        match self {
            ValueFunction::Terminal(payoff) => payoff.evaluate(states),
            ValueFunction::Fitted { model, .. } => model.predict(states),
        }
    }

    /// Estimated value of a single state.
    pub fn evaluate_row(&self, state: &[f64]) -> f64 {
        match self {
            ValueFunction::Terminal(payoff) => payoff.evaluate_row(state),
            ValueFunction::Fitted { model, .. } => {
                let batch = StateBatch::from_vec(state.to_vec(), state.len());
                model.predict(&batch).first().copied().unwrap_or(f64::NAN)
            }
        }
    }

    /// Hyperparameters of a fitted estimator; `None` at maturity.
    pub fn hyperparameters(&self) -> Option<Hyperparameters> {
        match self {
            ValueFunction::Terminal(_) => None,
            ValueFunction::Fitted {
                hyperparameters, ..
            } => Some(*hyperparameters),
        }
    }

    /// Returns `true` for the maturity estimator.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ValueFunction::Terminal(_))
    }
}

/// Estimators for exercise dates `0..=T`, indexed by date.
///
/// Built backwards: the chain starts with the payoff at maturity and each
/// [`push_fitted`](Self::push_fitted) adds the estimator one date earlier.
#[derive(Debug, Clone)]
pub struct ValueChain<P> {
    n_exercise: usize,
    /// Estimators from maturity backwards
    backward: Vec<ValueFunction<P>>,
}

impl<P: Predictor> ValueChain<P> {
    /// Chain holding only the payoff at maturity `T = n_exercise`.
    pub fn new(payoff: BasketPayoff, n_exercise: usize) -> Self {
        Self {
            n_exercise,
            backward: vec![ValueFunction::Terminal(payoff)],
        }
    }

    /// Adds the estimator for the date before [`earliest_date`](Self::earliest_date).
    ///
    /// Returns the date of the new estimator, or `None` if the chain already
    /// reaches date 0.
    pub fn push_fitted(&mut self, model: P, hyperparameters: Hyperparameters) -> Option<usize> {
        let date = self.earliest_date().checked_sub(1)?;
        self.backward.push(ValueFunction::Fitted {
            model,
            hyperparameters,
        });
        Some(date)
    }

    /// Number of exercise dates after the valuation date (`T`).
    #[inline]
    pub fn n_exercise(&self) -> usize {
        self.n_exercise
    }

    /// Earliest date holding an estimator.
    #[inline]
    pub fn earliest_date(&self) -> usize {
        self.n_exercise + 1 - self.backward.len()
    }

    /// Estimator at [`earliest_date`](Self::earliest_date).
    #[inline]
    pub fn earliest(&self) -> &ValueFunction<P> {
        &self.backward[self.backward.len() - 1]
    }

    /// Returns `true` once every date down to 0 holds an estimator.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.earliest_date() == 0
    }

    /// Estimator at date `t`, if built.
    pub fn get(&self, t: usize) -> Option<&ValueFunction<P>> {
        if t < self.earliest_date() || t > self.n_exercise {
            return None;
        }
        self.backward.get(self.n_exercise - t)
    }

    /// Estimator at maturity.
    #[inline]
    pub fn terminal(&self) -> &ValueFunction<P> {
        &self.backward[0]
    }

    /// `(date, estimator)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ValueFunction<P>)> + '_ {
        let first = self.earliest_date();
        self.backward
            .iter()
            .rev()
            .enumerate()
            .map(move |(i, v)| (first + i, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::instruments::PayoffKind;

    struct Constant(f64);

    impl Predictor for Constant {
        fn predict(&self, x: &StateBatch) -> Vec<f64> {
            vec![self.0; x.n_rows()]
        }
    }

    fn payoff() -> BasketPayoff {
        BasketPayoff::new(PayoffKind::MaxCall, 100.0).unwrap()
    }

    fn fitted(value: f64) -> ValueFunction<Constant> {
        ValueFunction::Fitted {
            model: Constant(value),
            hyperparameters: Hyperparameters::new(1e-6, 1.0),
        }
    }

    #[test]
    fn test_terminal_is_exact_payoff() {
        let terminal: ValueFunction<Constant> = ValueFunction::Terminal(payoff());
        let states = StateBatch::from_rows(&[[120.0, 90.0], [80.0, 85.0]]);
        assert_eq!(terminal.evaluate(&states), payoff().evaluate(&states));
        assert_eq!(terminal.evaluate_row(&[120.0, 90.0]), 20.0);
        assert!(terminal.hyperparameters().is_none());
    }

    #[test]
    fn test_fitted_delegates_to_model() {
        let v = fitted(3.5);
        assert_eq!(v.evaluate(&StateBatch::repeat_row(&[1.0], 3)), vec![3.5; 3]);
        assert_eq!(v.evaluate_row(&[1.0]), 3.5);
        assert!(v.hyperparameters().is_some());
    }

    #[test]
    fn test_chain_indexed_by_date() {
        let mut chain = ValueChain::new(payoff(), 2);
        assert_eq!(chain.earliest_date(), 2);
        assert!(!chain.is_complete());
        assert!(chain.earliest().is_terminal());

        assert_eq!(chain.push_fitted(Constant(2.0), Hyperparameters::new(1e-6, 1.0)), Some(1));
        assert_eq!(chain.push_fitted(Constant(1.0), Hyperparameters::new(1e-6, 1.0)), Some(0));
        assert!(chain.is_complete());

        assert_eq!(chain.n_exercise(), 2);
        assert!(chain.terminal().is_terminal());
        assert_eq!(chain.earliest().evaluate_row(&[0.0, 0.0]), 1.0);
        assert_eq!(chain.get(1).map(|v| v.evaluate_row(&[0.0, 0.0])), Some(2.0));
        assert!(chain.get(3).is_none());

        let dates: Vec<usize> = chain.iter().map(|(t, _)| t).collect();
        assert_eq!(dates, vec![0, 1, 2]);
    }

    #[test]
    fn test_chain_rejects_dates_before_zero() {
        let mut chain = ValueChain::new(payoff(), 1);
        assert_eq!(chain.push_fitted(Constant(0.0), Hyperparameters::new(0.0, 1.0)), Some(0));
        assert_eq!(chain.push_fitted(Constant(0.0), Hyperparameters::new(0.0, 1.0)), None);
        assert_eq!(chain.earliest_date(), 0);
    }
}
