//! # chifit-rs
//!
//! `chifit-rs` fits parametric curves to measured `(x, y)` data with optional
//! 1σ errors on both coordinates, by minimizing an effective-variance
//! chi-square.
//!
//! The library provides:
//! - A derivative-free Powell minimizer with Brent line searches
//! - Ridders' extrapolated numerical derivative
//! - Per-parameter errors from the profile chi-square
//! - Polynomial, exponential, power-law and errors-in-variables line models
//! - A fit session that runs the whole pipeline and exposes the results
//!
//! ## Basic Usage
//!
//! ```
//! use chifit_rs::{FitSession, PolynomialModel, SampleSet};
//!
//! let data = SampleSet::new(&[0.0, 1.0, 2.0, 3.0], &[2.0, 5.0, 8.0, 11.0]);
//! let fit = FitSession::new(PolynomialModel::linear(), &data).unwrap();
//!
//! assert!((fit.parameter(0).unwrap() - 2.0).abs() < 1e-9);
//! assert!((fit.parameter(1).unwrap() - 3.0).abs() < 1e-9);
//! ```

pub mod data;
pub mod error;
pub mod fit;
pub mod model;
pub mod models;
pub mod objective;
pub mod powell;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use data::{FitRange, RealData, Sample, SampleSet, SampleSource};
pub use error::{FitError, Result};
pub use fit::{FitResult, FitSession, FitSessionBuilder, FitStage, Residual};
pub use model::{Model, Optimum};
pub use models::{ExponentialModel, LinearModel, PolynomialModel, PowerLawModel};
pub use objective::{ChiSquare, Objective};
pub use powell::{BrentConfig, ConvergenceStatus, FitConfig, PowellConfig};
pub use utils::fit_batch;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
