//! Weighted linear least squares via the normal equations.
//!
//! Every model's first-pass guess reduces to a problem that is linear in its
//! (possibly transformed) parameters. The normal equations are small, so they
//! are solved directly with partially pivoted Gaussian elimination.

use crate::error::{FitError, Result};
use ndarray::{Array1, Array2};

/// A point of a weighted linear fit: the basis is evaluated at `x`, `y` is the
/// target and `sigma` its standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    /// Abscissa fed to the basis functions
    pub x: f64,
    /// Observed (possibly transformed) value
    pub y: f64,
    /// Standard deviation of `y`
    pub sigma: f64,
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// # Errors
///
/// * `DimensionMismatch` if `a` is not square or does not match `b`
/// * `SingularMatrix` if a zero pivot is met
pub fn gaussian_elimination(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    if a.shape() != [n, n] {
        return Err(FitError::DimensionMismatch(format!(
            "Expected a {}x{} matrix, got {:?}",
            n,
            n,
            a.shape()
        )));
    }

    // Forward elimination
    for i in 0..n {
        let mut max_idx = i;
        let mut max_val = a[[i, i]].abs();
        for j in i + 1..n {
            if a[[j, i]].abs() > max_val {
                max_idx = j;
                max_val = a[[j, i]].abs();
            }
        }

        if max_val == 0.0 || !max_val.is_finite() {
            return Err(FitError::SingularMatrix);
        }

        if max_idx != i {
            for k in 0..n {
                a.swap([i, k], [max_idx, k]);
            }
            b.swap(i, max_idx);
        }

        for j in i + 1..n {
            let factor = a[[j, i]] / a[[i, i]];
            for k in i..n {
                a[[j, k]] -= factor * a[[i, k]];
            }
            b[j] -= factor * b[i];
        }
    }

    // Backward substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in i + 1..n {
            sum += a[[i, j]] * x[j];
        }
        x[i] = (b[i] - sum) / a[[i, i]];
    }

    Ok(x)
}

/// Fit `y = Σ c_j · basis_j(x)` to `points`, weighting each by `1/sigma²`.
///
/// `basis` fills a slice of length `n_terms` with the basis values at `x`.
///
/// # Errors
///
/// * `Underdetermined` if there are fewer points than terms
/// * `SingularMatrix` if the normal equations are singular
pub fn weighted_least_squares<B>(
    points: &[WeightedPoint],
    n_terms: usize,
    basis: B,
) -> Result<Array1<f64>>
where
    B: Fn(f64, &mut [f64]),
{
    if points.len() < n_terms {
        return Err(FitError::Underdetermined {
            samples: points.len(),
            parameters: n_terms,
        });
    }

    let mut lhs = Array2::zeros((n_terms, n_terms));
    let mut rhs = Array1::zeros(n_terms);
    let mut phi = vec![0.0; n_terms];

    for point in points {
        basis(point.x, &mut phi);
        let w = 1.0 / (point.sigma * point.sigma);
        for j in 0..n_terms {
            rhs[j] += w * phi[j] * point.y;
            for k in 0..n_terms {
                lhs[[j, k]] += w * phi[j] * phi[k];
            }
        }
    }

    gaussian_elimination(lhs, rhs)
}

/// Fit a straight line `y = intercept + slope · x`, returning `[intercept, slope]`.
pub fn weighted_line(points: &[WeightedPoint]) -> Result<Array1<f64>> {
    weighted_least_squares(points, 2, |x, phi| {
        phi[0] = 1.0;
        phi[1] = x;
    })
}
