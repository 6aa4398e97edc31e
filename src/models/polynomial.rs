//! Polynomial models.
//!
//! A polynomial here is any combination of non-negative integer powers of x,
//!
//! f(x) = a0·x^k0 + a1·x^k1 + ... + an·x^kn
//!
//! so `{0, 1}` is a straight line, `{0, 1, 2}` a parabola and `{1, 3}` an odd
//! cubic without constant term. The model is linear in its coefficients, so
//! without x errors the chi-square minimum is the weighted least-squares
//! solution and no iterative refinement is needed.

use ndarray::Array1;

use crate::data::RealData;
use crate::error::{FitError, Result};
use crate::model::{Model, Optimum};
use crate::objective::{ChiSquare, Objective};
use crate::powell::{self, ConvergenceStatus, FitConfig};
use crate::utils::linear_solve::{weighted_least_squares, WeightedPoint};

/// A polynomial with an arbitrary set of integer powers.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    powers: Vec<u32>,
}

impl PolynomialModel {
    /// Create a polynomial from its powers, one coefficient per entry.
    ///
    /// # Arguments
    ///
    /// * `powers` - The power of x multiplying each coefficient
    ///
    /// # Returns
    ///
    /// * A new PolynomialModel, or `InvalidParameter` if `powers` is empty
    pub fn new(powers: Vec<u32>) -> Result<Self> {
        if powers.is_empty() {
            return Err(FitError::InvalidParameter(
                "a polynomial needs at least one power".to_string(),
            ));
        }
        Ok(Self { powers })
    }

    /// Full polynomial of the given degree, powers `0..=degree`.
    pub fn with_degree(degree: u32) -> Self {
        Self {
            powers: (0..=degree).collect(),
        }
    }

    /// `y = a0 + a1 x`
    pub fn linear() -> Self {
        Self::with_degree(1)
    }

    /// `y = a0 + a1 x + a2 x^2`
    pub fn quadratic() -> Self {
        Self::with_degree(2)
    }

    /// The powers of x, in coefficient order.
    pub fn powers(&self) -> &[u32] {
        &self.powers
    }

    fn basis(&self, x: f64, phi: &mut [f64]) {
        for (value, &power) in phi.iter_mut().zip(&self.powers) {
            *value = x.powi(power as i32);
        }
    }

    /// Weighted linear least-squares coefficients.
    ///
    /// Points are weighted by their y error; points without one get unit weight.
    fn least_squares(&self, data: &RealData) -> Result<Array1<f64>> {
        let points: Vec<WeightedPoint> = data
            .samples()
            .iter()
            .map(|s| WeightedPoint {
                x: s.x,
                y: s.y,
                sigma: if s.y_err > 0.0 { s.y_err } else { 1.0 },
            })
            .collect();

        weighted_least_squares(&points, self.powers.len(), |x, phi| self.basis(x, phi))
    }
}

impl Model for PolynomialModel {
    fn parameter_count(&self) -> usize {
        self.powers.len()
    }

    fn parameter_name(&self, index: usize) -> String {
        format!("a{}", index)
    }

    fn function_string(&self) -> String {
        let terms: Vec<String> = self
            .powers
            .iter()
            .enumerate()
            .map(|(i, &power)| match power {
                0 => format!("a{}", i),
                1 => format!("a{} x", i),
                _ => format!("a{} x^{}", i, power),
            })
            .collect();
        format!("y = {}", terms.join(" + "))
    }

    fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64 {
        self.powers
            .iter()
            .zip(parameters.iter())
            .map(|(&power, &a)| a * x.powi(power as i32))
            .sum()
    }

    fn derivative(&self, x: f64, parameters: &Array1<f64>, _step: f64) -> f64 {
        self.powers
            .iter()
            .zip(parameters.iter())
            .filter(|&(&power, _)| power > 0)
            .map(|(&power, &a)| a * power as f64 * x.powi(power as i32 - 1))
            .sum()
    }

    fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>> {
        self.least_squares(data)
    }

    fn refine(&self, data: &RealData, start: &Array1<f64>, config: &FitConfig) -> Result<Optimum> {
        let chi = ChiSquare::new(self, data);

        if data.has_x_errors() {
            return Ok(powell::refine(|p| chi.value(p), start, config).into());
        }

        // linear in the coefficients: the least-squares solution is the minimum
        let parameters = self.least_squares(data)?;
        Ok(Optimum {
            chi_square: chi.value(&parameters),
            parameters,
            iterations: 0,
            status: ConvergenceStatus::Converged,
            errors: None,
        })
    }
}
