//! Straight-line fits with errors in both variables.
//!
//! The line `y = a + b x` gets a dedicated two-stage scheme instead of the
//! generic Powell path:
//!
//! 1. A closed-form weighted least-squares pass in which x errors are folded
//!    into the weights through the spread of the data.
//! 2. When x errors are present, a 1-D search on the slope alone. For a fixed
//!    slope the best intercept is a weighted mean, so the chi-square becomes a
//!    function of `b` only and Brent's method minimizes it directly. The slope
//!    error is the offset at which that profile rises by one, found with
//!    Brent's root finder.
//!
//! In log-y mode the same machinery fits `ln y = A + b x` and reports
//! `a = e^A`, giving the model `y = a e^(b x)`.

use ndarray::{array, Array1};

use crate::data::{RealData, Sample};
use crate::error::{FitError, Result};
use crate::model::{Model, Optimum};
use crate::powell::{self, bracket_sign_change, find_root, ConvergenceStatus, FitConfig};

/// Slopes closer to zero than this are nudged away from it in the slope search.
const SMALL: f64 = 1.0e-10;
/// Iteration cap of the expanding slope bracket.
const BRACKET_ITERATIONS: usize = 100;

/// A sample in the space the line is fitted in.
///
/// `sy` is `1` when the sample has neither error.
#[derive(Debug, Clone, Copy)]
struct LinePoint {
    x: f64,
    y: f64,
    sx: f64,
    sy: f64,
}

impl LinePoint {
    /// Effective variance `sy² + b² sx²` at slope `b`, `1` where it vanishes.
    fn variance(&self, b: f64) -> f64 {
        let var = self.sy * self.sy + b * b * self.sx * self.sx;
        if var > 0.0 {
            var
        } else {
            1.0
        }
    }
}

/// Line parameters and their errors in fit space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineEstimate {
    a: f64,
    b: f64,
    a_err: f64,
    b_err: f64,
    chi_square: f64,
}

/// A straight line, optionally fitted to `ln y`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearModel {
    log_y: bool,
}

impl LinearModel {
    /// `y = a + b x`
    pub fn new() -> Self {
        Self { log_y: false }
    }

    /// `y = a e^(b x)`, fitted as a line through `ln y`.
    pub fn log_y() -> Self {
        Self { log_y: true }
    }

    /// Whether the model fits `ln y`.
    pub fn is_log_y(&self) -> bool {
        self.log_y
    }

    fn points(&self, data: &RealData) -> Vec<LinePoint> {
        data.samples()
            .iter()
            .map(|s| {
                let (y, sy) = if self.log_y {
                    (s.y.ln(), log_error(s, data.has_y_errors()))
                } else {
                    (s.y, s.y_err)
                };
                LinePoint {
                    x: s.x,
                    y,
                    sx: s.x_err,
                    sy: if sy == 0.0 && s.x_err == 0.0 { 1.0 } else { sy },
                }
            })
            .collect()
    }

    /// Convert a fit-space estimate to reported parameters and errors.
    fn report(&self, line: &LineEstimate) -> (Array1<f64>, Array1<f64>) {
        if self.log_y {
            let a = line.a.exp();
            let a_err = a - (line.a - line.a_err).exp();
            (array![a, line.b], array![a_err, line.b_err])
        } else {
            (array![line.a, line.b], array![line.a_err, line.b_err])
        }
    }
}

/// `|ln((y − σ)/y)|`, or zero (unknown) when undefined or unavailable.
fn log_error(sample: &Sample, has_y_errors: bool) -> f64 {
    if !has_y_errors {
        return 0.0;
    }
    let err = ((sample.y - sample.y_err) / sample.y).ln().abs();
    if err.is_finite() {
        err
    } else {
        0.0
    }
}

/// Sample variances of x and y.
fn variances(points: &[LinePoint]) -> (f64, f64) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    let vx = points.iter().map(|p| (p.x - mean_x).powi(2)).sum::<f64>() / (n - 1.0);
    let vy = points.iter().map(|p| (p.y - mean_y).powi(2)).sum::<f64>() / (n - 1.0);
    (vx, vy)
}

/// Closed-form weighted fit.
///
/// x errors enter the weights scaled by `sqrt(var y / var x)`, a slope
/// estimate that needs no fit. When every weight is unity the errors are
/// scaled by `sqrt(χ²/N)`.
fn closed_form(points: &[LinePoint]) -> Result<LineEstimate> {
    if points.len() < 2 {
        return Err(FitError::Underdetermined {
            samples: points.len(),
            parameters: 2,
        });
    }

    let (vx, vy) = variances(points);
    let resize = if vx > 0.0 { (vy / vx).sqrt() } else { 0.0 };

    let sigma: Vec<f64> = points.iter().map(|p| p.variance(resize).sqrt()).collect();

    let mut sw = 0.0;
    let mut swx = 0.0;
    for (p, s) in points.iter().zip(&sigma) {
        let w = 1.0 / (s * s);
        sw += w;
        swx += w * p.x;
    }
    let avg_x = swx / sw;

    let mut stt = 0.0;
    let mut b = 0.0;
    for (p, s) in points.iter().zip(&sigma) {
        let t = (p.x - avg_x) / s;
        stt += t * t;
        b += t * p.y / s;
    }
    if stt == 0.0 {
        return Err(FitError::SingularMatrix);
    }
    b /= stt;

    let a = points
        .iter()
        .zip(&sigma)
        .map(|(p, s)| (p.y - b * p.x) / (s * s))
        .sum::<f64>()
        / sw;

    let mut a_err = ((1.0 + swx * swx / (sw * stt)) / sw).sqrt();
    let mut b_err = (1.0 / stt).sqrt();

    let chi_square: f64 = points
        .iter()
        .zip(&sigma)
        .map(|(p, s)| ((p.y - a - b * p.x) / s).powi(2))
        .sum();

    if sigma.iter().all(|&s| s == 1.0) {
        let scale = (chi_square / points.len() as f64).sqrt();
        a_err *= scale;
        b_err *= scale;
    }

    Ok(LineEstimate {
        a,
        b,
        a_err,
        b_err,
        chi_square,
    })
}

/// Chi-square profile over the slope: returns `(χ²(b), a(b))`.
///
/// Each point's variance is `sy² + b² sx²` and the intercept is the weighted
/// mean of `y − b x`.
fn slope_profile(points: &[LinePoint], b: f64) -> (f64, f64) {
    let mut sw = 0.0;
    let mut swr = 0.0;
    for p in points {
        let w = 1.0 / p.variance(b);
        sw += w;
        swr += w * (p.y - b * p.x);
    }
    let a = swr / sw;

    let chi = points
        .iter()
        .map(|p| (p.y - a - b * p.x).powi(2) / p.variance(b))
        .sum();
    (chi, a)
}

/// Minimize the slope profile starting from the closed-form estimate.
///
/// Three passes, each expanding a multiplicative bracket around the current
/// slope until both ends lie above it, then refining with Brent's method.
fn slope_search(points: &[LinePoint], start: &LineEstimate, config: &FitConfig) -> LineEstimate {
    let chi = |b: f64| slope_profile(points, b).0;
    let mut b = start.b;

    for pass in 0..3 {
        let mut center = if b.abs() < SMALL { SMALL } else { b };
        let mut c_center = chi(center);
        let mut factor = 0.01;
        let mut lo = center * (1.0 - factor);
        let mut hi = center * (1.0 + factor);

        for _ in 1..BRACKET_ITERATIONS {
            let (c_lo, c_hi) = (chi(lo), chi(hi));
            if c_lo > c_center && c_hi > c_center {
                break;
            }
            if c_lo <= c_hi {
                center = lo;
                c_center = c_lo;
            } else {
                center = hi;
                c_center = c_hi;
            }
            if center.abs() < SMALL {
                center = SMALL;
                c_center = chi(center);
            }
            factor *= 1.2;
            lo = center * (1.0 - factor);
            hi = center * (1.0 + factor);
        }

        let min = powell::minimize(&chi, lo, center, hi, &config.brent);
        log::debug!("linear: slope pass {} b = {:.10e} chi2 = {:.6e}", pass, min.x, min.fx);
        b = min.x;
    }

    let (chi_square, a) = slope_profile(points, b);

    // slope error: where the profile has risen by one
    let rise = |delta: f64| 1.0 - (chi(b + delta) - chi_square);
    let scale = (b.abs() * 1e-3).max(SMALL);
    let b_err = bracket_sign_change(&rise, 0.0, scale, BRACKET_ITERATIONS)
        .and_then(|(pos, neg)| find_root(&rise, pos, neg, &config.brent))
        .map(|root| root.root.abs())
        .unwrap_or_else(|| {
            log::warn!("linear: slope error search failed, keeping closed-form error");
            start.b_err
        });

    let shifted = b + b_err;
    let (_, a_shifted) = slope_profile(points, shifted);
    let weight: f64 = points
        .iter()
        .map(|p| 1.0 / p.variance(shifted))
        .sum();
    let a_err = ((a_shifted - a).powi(2) + 1.0 / weight).sqrt();

    LineEstimate {
        a,
        b,
        a_err,
        b_err,
        chi_square,
    }
}

impl Model for LinearModel {
    fn parameter_count(&self) -> usize {
        2
    }

    fn function_string(&self) -> String {
        if self.log_y {
            "y = a e^(b x)".to_string()
        } else {
            "y = a + b x".to_string()
        }
    }

    fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64 {
        if self.log_y {
            parameters[0] * (parameters[1] * x).exp()
        } else {
            parameters[0] + parameters[1] * x
        }
    }

    fn accepts(&self, sample: &Sample) -> bool {
        !self.log_y || sample.y > 0.0
    }

    fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>> {
        let line = closed_form(&self.points(data))?;
        Ok(self.report(&line).0)
    }

    /// Fits the line in closed form; `start` is not needed.
    fn refine(&self, data: &RealData, _start: &Array1<f64>, config: &FitConfig) -> Result<Optimum> {
        let points = self.points(data);
        let mut line = closed_form(&points)?;
        if data.has_x_errors() {
            line = slope_search(&points, &line, config);
        }

        let (parameters, errors) = self.report(&line);
        Ok(Optimum {
            parameters,
            chi_square: line.chi_square,
            iterations: 0,
            status: ConvergenceStatus::Converged,
            errors: Some(errors),
        })
    }
}
