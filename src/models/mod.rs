//! Built-in models.
//!
//! Polynomials of arbitrary integer powers, exponential and power-law curves,
//! and a straight line with errors in both variables.

mod exponential;
mod linear;
mod polynomial;

pub use exponential::{ExponentialModel, PowerLawModel};
pub use linear::LinearModel;
pub use polynomial::PolynomialModel;
