//! Brent's method for 1-D minimization.
//!
//! Given a bracketing triple, the minimizer alternates between inverse
//! parabolic interpolation through the three best points and golden-section
//! steps, keeping whichever is safe.

use super::config::BrentConfig;
use super::convergence::ConvergenceStatus;

/// Golden-section fraction `(3 − √5)/2`.
const CGOLD: f64 = 0.3819660;

/// Result of a 1-D minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMinimum {
    /// Abscissa of the minimum
    pub x: f64,
    /// Function value at `x`
    pub fx: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the tolerance was met
    pub status: ConvergenceStatus,
}

fn sign(a: f64, b: f64) -> f64 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// Refine the minimum of `f` bracketed by `ax`, `bx`, `cx`.
///
/// `bx` must lie between `ax` and `cx` with `f(bx)` below both ends. On
/// hitting the iteration cap the best point found is returned.
pub fn minimize<F>(f: F, ax: f64, bx: f64, cx: f64, config: &BrentConfig) -> LineMinimum
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = if ax < cx { (ax, cx) } else { (cx, ax) };
    let (mut x, mut w, mut v) = (bx, bx, bx);
    let fb = f(bx);
    let (mut fx, mut fw, mut fv) = (fb, fb, fb);

    // e is the distance moved on the step before last, d the last step
    let mut e: f64 = 0.0;
    let mut d: f64 = 0.0;

    for iter in 1..=config.max_iterations {
        let xm = 0.5 * (a + b);
        let tol1 = config.tolerance * x.abs() + config.zeps;
        let tol2 = 2.0 * tol1;

        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return LineMinimum {
                x,
                fx,
                iterations: iter,
                status: ConvergenceStatus::Converged,
            };
        }

        if e.abs() > tol1 {
            // trial parabolic fit
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let etemp = e;
            e = d;

            if p.abs() >= (0.5 * q * etemp).abs() || p <= q * (a - x) || p >= q * (b - x) {
                e = if x >= xm { a - x } else { b - x };
                d = CGOLD * e;
            } else {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = sign(tol1, xm - x);
                }
            }
        } else {
            e = if x >= xm { a - x } else { b - x };
            d = CGOLD * e;
        }

        let u = if d.abs() >= tol1 { x + d } else { x + sign(tol1, d) };
        let fu = f(u);

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    log::debug!(
        "brent: iteration cap {} reached at x = {:e}",
        config.max_iterations,
        x
    );
    LineMinimum {
        x,
        fx,
        iterations: config.max_iterations,
        status: ConvergenceStatus::MaxIterationsReached,
    }
}
