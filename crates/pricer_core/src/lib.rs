//! # pricer_core: Numerical Foundation for the Kernel-DP Pricer
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Dense symmetric linear algebra: Cholesky factorisation and solves (`math::linalg`)
//! - Sample statistics for Monte Carlo estimates (`math::statistics`)
//! - Error types shared by the upper layers (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - statrs: Normal quantiles for confidence intervals
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::linalg::CholeskyFactor;
//! use pricer_core::math::statistics::{mean, standard_error};
//!
//! // Solve a small SPD system
//! let a = [4.0, 2.0, 2.0, 3.0];
//! let factor = CholeskyFactor::factorise(&a, 2).unwrap();
//! let x = factor.solve(&[2.0, 1.0]);
//! assert!((4.0 * x[0] + 2.0 * x[1] - 2.0).abs() < 1e-12);
//!
//! // Sample statistics
//! let samples = [1.0, 2.0, 3.0];
//! assert_eq!(mean(&samples), 2.0);
//! assert!(standard_error(&samples) > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
