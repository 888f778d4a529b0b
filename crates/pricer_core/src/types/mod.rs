//! Shared error types.
//!
//! # Re-exports
//!
//! - [`LinalgError`] from `error`

pub mod error;

pub use error::LinalgError;
