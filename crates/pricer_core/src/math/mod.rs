//! Numerical building blocks.
//!
//! - [`linalg`]: Cholesky factorisation of dense symmetric matrices
//! - [`statistics`]: Sample mean, standard error and normal quantiles

pub mod linalg;
pub mod statistics;
