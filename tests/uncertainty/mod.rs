//! Parameter errors on synthetic data with known Gaussian noise.
//!
//! For a large sample the profile errors should agree with the Cramér–Rao
//! bound `sqrt(diag((JᵀJ/σ²)⁻¹))` to well within a factor of two.

use approx::assert_relative_eq;
use chifit_rs::{ExponentialModel, FitSession, LinearModel, PolynomialModel};

use crate::test_helpers::{grid, noisy_set};

/// Inverse diagonal of a symmetric 2×2 Fisher matrix `[[f00, f01], [f01, f11]]`.
fn cramer_rao_2x2(f00: f64, f01: f64, f11: f64) -> (f64, f64) {
    let det = f00 * f11 - f01 * f01;
    ((f11 / det).sqrt(), (f00 / det).sqrt())
}

fn within_factor_two(estimate: f64, bound: f64) {
    assert!(
        estimate > 0.5 * bound && estimate < 2.0 * bound,
        "error {} not within a factor of two of {}",
        estimate,
        bound
    );
}

#[test]
fn test_line_errors_match_cramer_rao() {
    let sigma = 0.3;
    let x = grid(0.0, 0.05, 200);
    let set = noisy_set(&x, |x| 1.0 + 2.0 * x, sigma, 7);

    let (mut f00, mut f01, mut f11) = (0.0, 0.0, 0.0);
    for &x in &x {
        f00 += 1.0 / (sigma * sigma);
        f01 += x / (sigma * sigma);
        f11 += x * x / (sigma * sigma);
    }
    let (sa, sb) = cramer_rao_2x2(f00, f01, f11);

    let poly = FitSession::new(PolynomialModel::linear(), &set).unwrap();
    within_factor_two(poly.parameter_error(0).unwrap(), sa);
    within_factor_two(poly.parameter_error(1).unwrap(), sb);

    // the chi-square of a line is exactly quadratic: the profile is exact
    assert_relative_eq!(poly.parameter_error(1).unwrap(), sb, max_relative = 1e-3);

    let line = FitSession::new(LinearModel::new(), &set).unwrap();
    within_factor_two(line.parameter_error(0).unwrap(), sa);
    within_factor_two(line.parameter_error(1).unwrap(), sb);
}

#[test]
fn test_exponential_errors_match_cramer_rao() {
    let (a, b, sigma) = (5.0, -0.8, 0.05);
    let x = grid(0.0, 0.02, 200);
    let set = noisy_set(&x, |x| a * (b * x).exp(), sigma, 11);

    let (mut f00, mut f01, mut f11) = (0.0, 0.0, 0.0);
    for &x in &x {
        let da = (b * x).exp();
        let db = a * x * (b * x).exp();
        f00 += da * da / (sigma * sigma);
        f01 += da * db / (sigma * sigma);
        f11 += db * db / (sigma * sigma);
    }
    let (sa, sb) = cramer_rao_2x2(f00, f01, f11);

    let fit = FitSession::new(ExponentialModel, &set).unwrap();
    assert_relative_eq!(fit.parameter(0).unwrap(), a, epsilon = 5.0 * sa);
    assert_relative_eq!(fit.parameter(1).unwrap(), b, epsilon = 5.0 * sb);
    within_factor_two(fit.parameter_error(0).unwrap(), sa);
    within_factor_two(fit.parameter_error(1).unwrap(), sb);

    // unit-variance noise: reduced chi-square close to one
    let reduced = fit.goodness_of_fit();
    assert!(reduced > 0.7 && reduced < 1.3, "reduced chi-square {}", reduced);
}
