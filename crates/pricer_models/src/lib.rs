//! # Pricer Models (L2: Business Logic)
//!
//! Market dynamics, payoffs and continuation-value regressors.
//!
//! This crate provides:
//! - Batches of multi-asset states (`models::StateBatch`)
//! - Equicorrelation matrices with eager validity checks (`models::correlated`)
//! - Correlated GBM path stepping and marginal state sampling (`models::gbm`)
//! - Max-of-basket call and geometric-basket put payoffs (`instruments`)
//! - The `Regressor` capability with a Nyström kernel ridge implementation
//!   and a nearest-neighbour test double (`regression`)
//!
//! ## Design Principles
//!
//! - **Explicit random streams**: every sampling function takes `&mut R: Rng`
//! - **Immutable batches**: stepping produces a new batch, never mutates in place
//! - **Enum-based payoffs** for static dispatch

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod instruments;
pub mod models;
pub mod regression;
