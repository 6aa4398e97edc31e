//! Numerical helpers shared by the models and the optimizer.

pub mod linear_solve;
pub mod parallel;
pub mod ridders;

pub use linear_solve::{gaussian_elimination, weighted_least_squares, weighted_line, WeightedPoint};
pub use parallel::fit_batch;
pub use ridders::{derivative, DerivativeEstimate};
