//! Derivative-free minimization.
//!
//! Powell's direction-set method for N-dimensional objectives, built on a
//! downhill bracket search and Brent's line minimizer. Brent's root finder
//! lives here too since it shares the configuration and termination types.

pub mod algorithm;
pub mod bracket;
pub mod brent;
pub mod config;
pub mod convergence;
pub mod root;

pub use algorithm::{minimize_n, refine, PowellResult};
pub use bracket::{bracket, Bracket};
pub use brent::{minimize, LineMinimum};
pub use config::{BrentConfig, FitConfig, PowellConfig};
pub use convergence::ConvergenceStatus;
pub use root::{bracket_sign_change, find_root, RootEstimate};
