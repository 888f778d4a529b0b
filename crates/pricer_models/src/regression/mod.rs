//! Continuation-value regressors.
//!
//! - [`Regressor`] / [`Predictor`]: fit and predict capability
//! - [`NystromKrr`]: Gaussian kernel ridge regression with Nyström centres
//! - [`NearestNeighbour`]: k-nearest-neighbour averaging test double
//!
//! Regressors use static dispatch; the pricing engine is generic over
//! `R: Regressor`.

mod error;
mod kernel;
mod nearest;
mod nystrom;
mod traits;

pub use error::RegressionError;
pub use kernel::{ComputeDevice, GaussianKernel};
pub use nearest::{NearestModel, NearestNeighbour};
pub use nystrom::{NystromKrr, NystromModel};
pub use traits::{gamma_from_lengthscale, Hyperparameters, Predictor, Regressor};
