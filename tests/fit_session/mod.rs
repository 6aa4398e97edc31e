//! Tests for fit sessions across the built-in models.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use approx::assert_relative_eq;
use chifit_rs::{
    fit_batch, ConvergenceStatus, ExponentialModel, FitConfig, FitError, FitRange, FitSession,
    FitStage, LinearModel, Model, PolynomialModel, PowellConfig, PowerLawModel, Sample, SampleSet,
};
use ndarray::array;

use crate::test_helpers::{exact_set, grid, ols_line};

#[test]
fn test_exact_recovery_polynomial() {
    let set = exact_set(&grid(0.0, 1.0, 5), |x| 2.0 + 3.0 * x);
    let fit = FitSession::new(PolynomialModel::linear(), &set).unwrap();

    assert_relative_eq!(fit.parameter(0).unwrap(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(fit.parameter(1).unwrap(), 3.0, epsilon = 1e-9);
    assert!(fit.chi_square() < 1e-18);
    assert_eq!(fit.stage(), FitStage::ResidualsGenerated);
}

#[test]
fn test_exact_recovery_cubic() {
    let set = exact_set(&grid(-2.0, 0.25, 17), |x| 0.5 - x + 0.25 * x.powi(3));
    let model = PolynomialModel::new(vec![0, 1, 3]).unwrap();
    let fit = FitSession::new(model, &set).unwrap();

    assert_relative_eq!(fit.parameter(0).unwrap(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(fit.parameter(1).unwrap(), -1.0, epsilon = 1e-9);
    assert_relative_eq!(fit.parameter(2).unwrap(), 0.25, epsilon = 1e-9);
    assert_eq!(fit.function_string(), "y = a0 + a1 x + a2 x^3");
}

#[test]
fn test_linear_matches_ols() {
    let x = grid(0.0, 0.5, 12);
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, x)| 1.0 - 0.4 * x + if i % 2 == 0 { 0.3 } else { -0.2 })
        .collect();
    let set = SampleSet::new(&x, &y).with_y_errors(&[0.25; 12]);
    let fit = FitSession::new(LinearModel::new(), &set).unwrap();

    let (a, b) = ols_line(&x, &y);
    assert_relative_eq!(fit.parameter(0).unwrap(), a, max_relative = 1e-8);
    assert_relative_eq!(fit.parameter(1).unwrap(), b, max_relative = 1e-8);
    assert_eq!(fit.parameter_name(0).unwrap(), "a");
    assert_eq!(fit.parameter_name(1).unwrap(), "b");
}

#[test]
fn test_linear_errors_in_both_variables() {
    let x = grid(0.0, 1.0, 8);
    let y: Vec<f64> = x.iter().map(|x| 0.5 + 1.5 * x).collect();
    let set = SampleSet::new(&x, &y)
        .with_y_errors(&[0.2; 8])
        .with_x_errors(&[0.1; 8]);
    let fit = FitSession::new(LinearModel::new(), &set).unwrap();

    assert_relative_eq!(fit.parameter(0).unwrap(), 0.5, epsilon = 1e-6);
    assert_relative_eq!(fit.parameter(1).unwrap(), 1.5, epsilon = 1e-6);
    let (sa, sb) = (fit.parameter_error(0).unwrap(), fit.parameter_error(1).unwrap());
    assert!(sa > 0.0 && sa.is_finite());
    assert!(sb > 0.0 && sb.is_finite());
}

#[test]
fn test_linear_log_y_excludes_non_positive() {
    let mut set = exact_set(&grid(0.0, 0.5, 6), |x| 2.0 * (0.3 * x).exp());
    set.push(Sample::new(1.2, -1.0));
    let fit = FitSession::new(LinearModel::log_y(), &set).unwrap();

    assert_eq!(fit.data().len(), 6);
    assert_relative_eq!(fit.parameter(0).unwrap(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(fit.parameter(1).unwrap(), 0.3, epsilon = 1e-9);
    assert_eq!(fit.function_string(), "y = a e^(b x)");
}

#[test]
fn test_power_law_excludes_non_positive_x() {
    let mut set = exact_set(&grid(0.5, 0.5, 10), |x| 2.0 * x.powf(-1.3));
    set.push(Sample::new(0.0, 5.0));
    set.push(Sample::new(-1.0, 5.0));
    let fit = FitSession::new(PowerLawModel, &set).unwrap();

    assert_eq!(fit.data().len(), 10);
    assert_relative_eq!(fit.parameter(0).unwrap(), 2.0, epsilon = 1e-6);
    assert_relative_eq!(fit.parameter(1).unwrap(), -1.3, epsilon = 1e-6);
}

#[test]
fn test_range_window() {
    let mut set = exact_set(&grid(0.0, 1.0, 6), |x| 1.0 + x);
    set.push(Sample::new(2.5, 40.0));
    let fit = FitSession::builder(PolynomialModel::linear())
        .with_range(FitRange::new(0.0, 10.0, 0.0, 10.0))
        .generate_fit(&set)
        .unwrap();

    assert_eq!(fit.data().len(), 6);
    assert_relative_eq!(fit.parameter(1).unwrap(), 1.0, epsilon = 1e-9);
    assert_eq!(fit.data().x_range(), (0.0, 10.0));
}

#[test]
fn test_range_y_bounds() {
    let mut set = exact_set(&grid(0.0, 1.0, 6), |x| 1.0 + x);
    set.push(Sample::new(2.5, 9.0));
    set.push(Sample::new(3.5, -4.0));
    let fit = FitSession::builder(PolynomialModel::linear())
        .with_range(FitRange::new(-1.0, 6.0, 7.0, 0.5))
        .generate_fit(&set)
        .unwrap();

    // both extra samples lie inside the x bounds but outside the y bounds
    assert_eq!(fit.data().len(), 6);
    assert!(fit.data().samples().iter().all(|s| s.y >= 0.5 && s.y <= 7.0));
    assert_relative_eq!(fit.parameter(0).unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(fit.parameter(1).unwrap(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_x_errors_only_agree_across_models() {
    let x = grid(0.0, 1.0, 8);
    let noise = [0.15, -0.1, 0.05, -0.2, 0.1, 0.2, -0.15, 0.05];
    let y: Vec<f64> = x.iter().zip(&noise).map(|(x, n)| 1.0 + 2.0 * x + n).collect();
    let set = SampleSet::new(&x, &y).with_x_errors(&[0.1; 8]);

    let line = FitSession::new(LinearModel::new(), &set).unwrap();
    let poly = FitSession::new(PolynomialModel::linear(), &set).unwrap();

    // both minimize Σ r² / (b σx)²
    assert_relative_eq!(line.chi_square(), poly.chi_square(), max_relative = 1e-6);
    assert_relative_eq!(line.parameter(0).unwrap(), poly.parameter(0).unwrap(), epsilon = 1e-5);
    assert_relative_eq!(line.parameter(1).unwrap(), poly.parameter(1).unwrap(), epsilon = 1e-5);
    assert_relative_eq!(line.goodness_of_fit(), poly.goodness_of_fit(), max_relative = 1e-6);

    let slope = poly.parameter(1).unwrap();
    let residual_chi: f64 = x
        .iter()
        .zip(&y)
        .map(|(&x, &y)| (y - poly.y_value(x)).powi(2) / (slope * 0.1).powi(2))
        .sum();
    assert_relative_eq!(poly.chi_square(), residual_chi, max_relative = 1e-9);

    assert_relative_eq!(
        line.parameter_error(1).unwrap(),
        poly.parameter_error(1).unwrap(),
        max_relative = 1e-2
    );
    let (la, pa) = (line.parameter_error(0).unwrap(), poly.parameter_error(0).unwrap());
    assert!(la > 0.5 * pa && la < 2.0 * pa, "intercept errors {} and {}", la, pa);
}

#[test]
fn test_underdetermined_after_range() {
    let set = exact_set(&grid(0.0, 1.0, 10), |x| x * x);
    let err = FitSession::builder(PolynomialModel::quadratic())
        .with_range(FitRange::new(0.0, 1.0, -5.0, 5.0))
        .generate_fit(&set)
        .unwrap_err();

    assert!(matches!(
        err,
        FitError::Underdetermined {
            samples: 2,
            parameters: 3
        }
    ));
}

#[test]
fn test_missing_errors() {
    let set = exact_set(&grid(0.0, 1.0, 4), |x| 3.0 * x);
    let fit = FitSession::new(ExponentialModel, &set).unwrap();

    assert!(matches!(fit.parameter_error(0), Err(FitError::MissingErrors)));
    assert_eq!(fit.goodness_of_fit_name(), "Std dev");
    assert_relative_eq!(fit.goodness_of_fit(), fit.residual_std_dev());
    let sd = fit.residual_std_dev();
    for r in fit.residuals() {
        assert_relative_eq!(r.y_err, sd);
    }
}

#[test]
fn test_initial_parameters_skip_guess() {
    let set = exact_set(&grid(0.0, 0.25, 12), |x| 4.0 * (-1.1 * x).exp()).with_y_errors(&[0.01; 12]);
    let fit = FitSession::builder(ExponentialModel)
        .with_initial_parameters(array![1.0, -0.5])
        .generate_fit(&set)
        .unwrap();

    assert_relative_eq!(fit.parameter(0).unwrap(), 4.0, epsilon = 1e-5);
    assert_relative_eq!(fit.parameter(1).unwrap(), -1.1, epsilon = 1e-5);
    assert!(fit.iterations() > 0);
}

#[test]
fn test_cancelled_fit_returns_start() {
    let set = exact_set(&grid(0.0, 0.25, 12), |x| 4.0 * (-1.1 * x).exp()).with_y_errors(&[0.01; 12]);
    let flag = Arc::new(AtomicBool::new(true));
    let config =
        FitConfig::default().with_powell(PowellConfig::default().with_cancel_flag(flag.clone()));

    let fit = FitSession::builder(ExponentialModel)
        .with_config(config)
        .with_initial_parameters(array![1.0, -0.5])
        .generate_fit(&set)
        .unwrap();

    assert_eq!(fit.status(), ConvergenceStatus::Cancelled);
    assert_eq!(fit.iterations(), 0);
    assert_eq!(fit.parameters(), &array![1.0, -0.5]);
    assert_eq!(fit.stage(), FitStage::ResidualsGenerated);
}

#[test]
fn test_boxed_models_in_sessions() {
    let set = exact_set(&grid(1.0, 1.0, 6), |x| 3.0 * x.powf(0.5)).with_y_errors(&[0.05; 6]);
    let models: Vec<Box<dyn Model>> = vec![
        Box::new(PowerLawModel),
        Box::new(PolynomialModel::quadratic()),
        Box::new(ExponentialModel),
    ];

    let fits: Vec<_> = models
        .into_iter()
        .map(|m| FitSession::new(m, &set).unwrap())
        .collect();

    // the true model wins
    assert!(fits[0].chi_square() < 1e-8);
    assert!(fits[0].chi_square() < fits[1].chi_square());
    assert!(fits[0].chi_square() < fits[2].chi_square());
}

#[test]
fn test_result_round_trips_through_json() {
    let set = exact_set(&grid(0.0, 1.0, 5), |x| 1.0 - 2.0 * x).with_y_errors(&[0.1; 5]);
    let result = FitSession::new(PolynomialModel::linear(), &set).unwrap().result();

    let json = result.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["parameters"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn test_batch_matches_sequential() {
    let sets: Vec<SampleSet> = (0..8)
        .map(|i| exact_set(&grid(0.0, 1.0, 6), move |x| i as f64 + 0.5 * x).with_y_errors(&[0.1; 6]))
        .collect();
    let model = PolynomialModel::linear();
    let batch = fit_batch(&model, &sets, &FitConfig::default());

    for (set, result) in sets.iter().zip(&batch) {
        let sequential = FitSession::new(model.clone(), set).unwrap().result();
        assert_eq!(result.as_ref().unwrap(), &sequential);
    }
}
