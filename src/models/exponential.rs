//! Exponential and power-law models.
//!
//! Both are fitted in two stages: a straight-line fit in log space gives the
//! first guess, then Powell refines it on the full chi-square. Samples with
//! `y <= 0` have no logarithm and are skipped by the first stage only.

use ndarray::{array, Array1};

use crate::data::{RealData, Sample};
use crate::error::Result;
use crate::model::Model;
use crate::utils::linear_solve::{weighted_line, WeightedPoint};

/// Uncertainty of `ln y` propagated from the y error, `|ln((y − σ)/y)|`.
///
/// Samples without a y error get unit weight. Returns `None` when the
/// propagated value is undefined (`σ >= y`).
fn log_sigma(sample: &Sample, weighted: bool) -> Option<f64> {
    if !weighted || sample.y_err == 0.0 {
        return Some(1.0);
    }
    let sigma = ((sample.y - sample.y_err) / sample.y).ln().abs();
    if sigma.is_finite() && sigma > 0.0 {
        Some(sigma)
    } else {
        None
    }
}

/// Fit `ln y = ln a + b·u(x)` and return `[a, b]`.
fn log_linear_guess<U>(data: &RealData, transform: U) -> Result<Array1<f64>>
where
    U: Fn(f64) -> Option<f64>,
{
    let points: Vec<WeightedPoint> = data
        .samples()
        .iter()
        .filter(|s| s.y > 0.0)
        .filter_map(|s| {
            let u = transform(s.x)?;
            let sigma = log_sigma(s, data.has_y_errors())?;
            Some(WeightedPoint {
                x: u,
                y: s.y.ln(),
                sigma,
            })
        })
        .collect();

    log::debug!(
        "log-linear guess from {} of {} samples",
        points.len(),
        data.len()
    );
    let line = weighted_line(&points)?;
    Ok(array![line[0].exp(), line[1]])
}

/// An exponential model
///
/// f(x) = a·e^(b·x)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExponentialModel;

impl ExponentialModel {
    /// Create a new exponential model.
    pub fn new() -> Self {
        Self
    }
}

impl Model for ExponentialModel {
    fn parameter_count(&self) -> usize {
        2
    }

    fn function_string(&self) -> String {
        "y = a e^(b x)".to_string()
    }

    fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64 {
        parameters[0] * (parameters[1] * x).exp()
    }

    fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>> {
        log_linear_guess(data, Some)
    }
}

/// A power law model
///
/// f(x) = a·x^b
///
/// Only samples with `x > 0` take part, since `x^b` is undefined for negative
/// x and non-integer b.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerLawModel;

impl PowerLawModel {
    /// Create a new power law model.
    pub fn new() -> Self {
        Self
    }
}

impl Model for PowerLawModel {
    fn parameter_count(&self) -> usize {
        2
    }

    fn function_string(&self) -> String {
        "y = a x^b".to_string()
    }

    fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64 {
        parameters[0] * x.powf(parameters[1])
    }

    fn accepts(&self, sample: &Sample) -> bool {
        sample.x > 0.0
    }

    fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>> {
        log_linear_guess(data, |x| if x > 0.0 { Some(x.ln()) } else { None })
    }
}
