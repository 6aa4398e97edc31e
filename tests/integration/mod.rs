//! End-to-end scenarios through the public API.

use approx::assert_relative_eq;
use chifit_rs::{
    ExponentialModel, FitSession, LinearModel, Model, PolynomialModel, Sample, SampleSet,
    SampleSource,
};

use crate::test_helpers::{grid, noisy_set};

/// A source backed by a plot-like curve that stores errors separately.
struct Curve {
    x: Vec<f64>,
    y: Vec<f64>,
    y_err: Option<Vec<f64>>,
}

impl SampleSource for Curve {
    fn sample_count(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    fn sample(&self, index: usize) -> Sample {
        let y_err = self.y_err.as_ref().map_or(0.0, |e| e[index]);
        Sample::with_errors(self.x[index], self.y[index], 0.0, y_err)
    }

    fn has_x_errors(&self) -> bool {
        false
    }

    fn has_y_errors(&self) -> bool {
        self.y_err.is_some()
    }
}

#[test]
fn test_exponential_scenario() {
    let curve = Curve {
        x: vec![0.0, 1.0, 2.0, 3.0],
        y: vec![1.0, 2.72, 7.39, 20.1],
        y_err: Some(vec![0.1; 4]),
    };
    let fit = FitSession::new(ExponentialModel, &curve).unwrap();

    assert_relative_eq!(fit.parameter(0).unwrap(), 1.0, epsilon = 1e-2);
    assert_relative_eq!(fit.parameter(1).unwrap(), 1.0, epsilon = 1e-2);
    assert_eq!(fit.goodness_of_fit_name(), "Chi²/(N-2)");

    // the rounded data lie well inside their error bars
    let reduced = fit.goodness_of_fit();
    assert!(reduced.is_finite() && reduced < 1.0, "reduced chi-square {}", reduced);
    assert!(fit.parameter_error(0).unwrap() > 0.0);
    assert!(fit.parameter_error(1).unwrap() > 0.0);
}

#[test]
fn test_model_comparison_on_noisy_parabola() {
    let x = grid(-3.0, 0.1, 61);
    let set = noisy_set(&x, |x| 0.5 * x * x - x + 2.0, 0.2, 3);

    let line = FitSession::new(LinearModel::new(), &set).unwrap();
    let parabola = FitSession::new(PolynomialModel::quadratic(), &set).unwrap();

    assert!(parabola.goodness_of_fit() < 1.5);
    assert!(line.goodness_of_fit() > 10.0);

    let coefficients = parabola.parameters();
    assert_relative_eq!(coefficients[0], 2.0, epsilon = 0.2);
    assert_relative_eq!(coefficients[1], -1.0, epsilon = 0.07);
    assert_relative_eq!(coefficients[2], 0.5, epsilon = 0.04);
}

#[test]
fn test_residuals_and_curve_queries() {
    let x = grid(0.0, 1.0, 5);
    let y = [1.1, 2.9, 5.2, 6.8, 9.1];
    let set = SampleSet::new(&x, &y).with_y_errors(&[0.2; 5]);
    let fit = FitSession::new(PolynomialModel::linear(), &set).unwrap();

    for (r, (&x, &y)) in fit.residuals().iter().zip(x.iter().zip(&y)) {
        assert_eq!(r.x, x);
        assert_relative_eq!(r.y, y - fit.y_value(x), epsilon = 1e-12);
        assert_eq!(r.y_err, 0.2);
    }

    let (lo, hi) = fit.y_range(0.0, 4.0);
    assert_relative_eq!(lo, fit.y_value(0.0), epsilon = 1e-12);
    assert_relative_eq!(hi, fit.y_value(4.0), epsilon = 1e-12);
}

#[test]
fn test_session_reports_model_metadata() {
    let set = noisy_set(&grid(0.0, 0.5, 10), |x| 2.0 * (0.4 * x).exp(), 0.05, 5);
    let fit = FitSession::new(LinearModel::log_y(), &set).unwrap();

    assert_eq!(fit.parameter_count(), 2);
    assert_eq!(fit.model().function_string(), fit.function_string());
    assert!(fit.model().is_log_y());
    assert_relative_eq!(fit.parameter(0).unwrap(), 2.0, epsilon = 0.1);
    assert_relative_eq!(fit.parameter(1).unwrap(), 0.4, epsilon = 0.05);
}
