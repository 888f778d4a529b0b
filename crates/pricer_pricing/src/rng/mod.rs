//! # Random Number Generation Infrastructure
//!
//! Seeded pseudo-random streams for the regression Monte Carlo engine.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: every stream is seeded; a fixed top-level seed
//!   reproduces a whole run bit for bit
//! - **Explicit streams**: generators are passed by `&mut`, never global
//! - **Parallel independence**: parallel units take a [`PricerRng::substream`]
//!   keyed by their index, so results are independent of thread count
//!
//! ## British English Convention
//!
//! All documentation in this module uses British English spelling conventions
//! ("initialise", "randomise", "behaviour").
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//! use rand::Rng;
//! use rand_distr::StandardNormal;
//!
//! let root = PricerRng::from_seed(7);
//! let mut repetition = root.substream(0);
//! let z: f64 = repetition.sample(StandardNormal);
//! assert!(z.is_finite());
//! ```

mod prng;

pub use prng::{derive_seed, splitmix64, PricerRng};
