//! Brent's method for 1-D root finding.
//!
//! The same safeguarded scheme as the minimizer, solving for a zero instead:
//! inverse quadratic interpolation when it stays inside the bracket and
//! converges fast enough, bisection otherwise.

use super::config::BrentConfig;
use super::convergence::ConvergenceStatus;

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    /// Abscissa of the root
    pub root: f64,
    /// Function value at `root`
    pub value: f64,
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

/// Expand symmetrically around `x0` until `f` changes sign.
///
/// Each iteration widens the interval on both sides by `scale·factor`, with
/// the factor growing by 20% per step. Of the points tried, the positive and
/// negative values closest to zero are kept. Returns `(x_pos, x_neg)`, or
/// `None` when no sign change is found within the iteration cap.
pub fn bracket_sign_change<F>(f: F, x0: f64, scale: f64, max_iterations: usize) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let mut factor = 0.1;
    let (mut lo, mut hi) = (x0, x0);
    let mut pos: Option<(f64, f64)> = None;
    let mut neg: Option<(f64, f64)> = None;

    for _ in 0..max_iterations {
        lo -= scale * factor;
        hi += scale * factor;
        record(&mut pos, &mut neg, lo, f(lo));
        record(&mut pos, &mut neg, hi, f(hi));

        if let (Some((xp, _)), Some((xn, _))) = (pos, neg) {
            return Some((xp, xn));
        }
        factor *= 1.2;
    }

    log::warn!(
        "root: no sign change within [{:e}, {:e}] after {} expansions",
        lo,
        hi,
        max_iterations
    );
    None
}

/// Keep `(x, y)` if it is the positive or negative value closest to zero so far.
fn record(pos: &mut Option<(f64, f64)>, neg: &mut Option<(f64, f64)>, x: f64, y: f64) {
    if y < 0.0 && neg.map_or(true, |(_, best)| y > best) {
        *neg = Some((x, y));
    } else if y > 0.0 && pos.map_or(true, |(_, best)| y < best) {
        *pos = Some((x, y));
    }
}

/// Find a root of `f` between `a` and `b`.
///
/// Returns `None` when `f(a)` and `f(b)` have the same sign. On hitting the
/// iteration cap the latest estimate is returned.
pub fn find_root<F>(f: F, a: f64, b: f64, config: &BrentConfig) -> Option<RootEstimate>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);

    if (fa > 0.0 && fb > 0.0) || (fa < 0.0 && fb < 0.0) {
        return None;
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = 0.0;
    let mut e = 0.0;

    for iter in 1..=config.max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            // rename so that b and c bracket the root
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.tolerance;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Some(RootEstimate {
                root: b,
                value: fb,
                iterations: iter,
                status: ConvergenceStatus::Converged,
            });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // attempt inverse quadratic interpolation
            let s = fb / fa;
            let (mut p, mut q);
            if a == c {
                p = 2.0 * xm * s;
                q = 1.0 - s;
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0));
                q = (qa - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { sign(tol1, xm) };
        fb = f(b);
    }

    log::debug!("root: iteration cap {} reached at x = {:e}", config.max_iterations, b);
    Some(RootEstimate {
        root: b,
        value: fb,
        iterations: config.max_iterations,
        status: ConvergenceStatus::MaxIterationsReached,
    })
}
