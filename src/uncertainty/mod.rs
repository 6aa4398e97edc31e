//! # Parameter Uncertainties
//!
//! Per-parameter 1σ errors from the chi-square surface. Each error is found
//! independently by holding one parameter at growing offsets from its fitted
//! value, re-minimizing the others and locating where the chi-square rises
//! by one. No covariance is reported.

mod profile;

pub use profile::{parameter_error, profile_errors};
