//! Tests for the derivative, bracketing and minimization routines.

use approx::assert_relative_eq;
use chifit_rs::powell::{self, bracket, find_root, BrentConfig, PowellConfig};
use chifit_rs::utils::derivative;
use ndarray::{array, Array1};

#[test]
fn test_ridders_cubic() {
    let estimate = derivative(|x| x * x * x, 2.0, 0.1);
    assert_relative_eq!(estimate.value, 12.0, epsilon = 1e-6);
    assert!(estimate.error < 1e-6);
}

#[test]
fn test_ridders_large_step() {
    // the starting step only needs to match the scale of the function
    let estimate = derivative(f64::exp, 1.0, 0.5);
    assert_relative_eq!(estimate.value, std::f64::consts::E, epsilon = 1e-8);
}

#[test]
fn test_bracket_validity() {
    let functions: Vec<Box<dyn Fn(f64) -> f64>> = vec![
        Box::new(|x| (x - 3.0).powi(2)),
        Box::new(|x| (x + 40.0).powi(2) + 1.0),
        Box::new(|x| x.cosh()),
        Box::new(|x| (x - 0.01).powi(4)),
        Box::new(|x| -(-(x - 7.0).powi(2)).exp()),
    ];

    for f in &functions {
        let b = bracket(f, 0.0, 1.0);
        assert!(b.fb <= b.fa, "f(b) = {} > f(a) = {}", b.fb, b.fa);
        assert!(b.fb <= b.fc, "f(b) = {} > f(c) = {}", b.fb, b.fc);
        assert!((b.a - b.b) * (b.b - b.c) >= 0.0, "b not between a and c");
    }
}

#[test]
fn test_line_minimum_after_bracket() {
    let f = |x: f64| (x - 1.234).powi(2) + 0.5;
    let b = bracket(f, -10.0, -9.0);
    let min = powell::minimize(f, b.a, b.b, b.c, &BrentConfig::default());

    assert_relative_eq!(min.x, 1.234, epsilon = 1e-6);
    assert_relative_eq!(min.fx, 0.5, epsilon = 1e-12);
}

#[test]
fn test_root_after_sign_change() {
    let f = |x: f64| x.powi(3) - 8.0;
    let (pos, neg) = powell::bracket_sign_change(f, 0.0, 1.0, 100).unwrap();
    let root = find_root(f, pos, neg, &BrentConfig::default()).unwrap();
    assert_relative_eq!(root.root, 2.0, epsilon = 1e-9);
}

fn rosenbrock(p: &Array1<f64>) -> f64 {
    (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2)
}

#[test]
fn test_powell_monotone_descent() {
    let result = powell::minimize_n(rosenbrock, &array![-1.2, 1.0], &PowellConfig::default());

    assert!(!result.history.is_empty());
    assert!(result.history[0] <= rosenbrock(&array![-1.2, 1.0]));
    for pair in result.history.windows(2) {
        assert!(pair[1] <= pair[0], "chi-square rose from {} to {}", pair[0], pair[1]);
    }
    assert!(result.value < 1e-4);
}

#[test]
fn test_powell_four_dimensions() {
    let center = array![1.0, -2.0, 3.0, 0.5];
    let f = |p: &Array1<f64>| {
        let d = p - &center;
        d[0] * d[0] + 2.0 * d[1] * d[1] + 0.5 * d[2] * d[2] + 4.0 * d[3] * d[3] + d[0] * d[1]
    };
    let result = powell::minimize_n(f, &Array1::zeros(4), &PowellConfig::default());

    for (found, expected) in result.parameters.iter().zip(center.iter()) {
        assert_relative_eq!(*found, *expected, epsilon = 1e-5);
    }
}
