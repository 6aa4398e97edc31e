//! Profile chi-square error search.
//!
//! The 1σ error of parameter `k` is the offset `δ` at which the chi-square,
//! re-minimized over all other parameters with `p_k` held at `p̂_k + δ`,
//! rises to `χ²_min + 1`. The search takes a cheap first guess along the
//! parameter's own axis, grows the offset tenfold while the profile stays
//! below the target, steps linearly to locate the crossing, and finally
//! solves the quadratic through the last three profile samples.

use ndarray::Array1;

use crate::objective::{FixedParameter, Objective};
use crate::powell::{self, bracket, FitConfig};

/// 1σ error of every parameter of `objective` at its minimum `optimum`.
///
/// Errors are independent per parameter: no covariance terms are reported.
///
/// # Arguments
///
/// * `objective` - The chi-square surface
/// * `optimum` - Parameters at the minimum
/// * `chi_min` - Objective value at `optimum`
/// * `config` - Optimizer and search settings
pub fn profile_errors<O: Objective + ?Sized>(
    objective: &O,
    optimum: &Array1<f64>,
    chi_min: f64,
    config: &FitConfig,
) -> Array1<f64> {
    (0..optimum.len())
        .map(|k| parameter_error(objective, optimum, chi_min, k, config))
        .collect()
}

/// 1σ error of parameter `index`, as a non-negative magnitude.
///
/// The search runs on the side of the parameter's sign (positive for zero).
/// The quadratic root is returned even if it falls outside the three points
/// used to fit it.
pub fn parameter_error<O: Objective + ?Sized>(
    objective: &O,
    optimum: &Array1<f64>,
    chi_min: f64,
    index: usize,
    config: &FitConfig,
) -> f64 {
    let target = chi_min + 1.0;
    let nominal = optimum[index];
    let direction = if nominal < 0.0 { -1.0 } else { 1.0 };
    let scale = if nominal != 0.0 { nominal.abs() } else { 1.0 };

    let free_start = FixedParameter::new(objective, index, nominal).reduce(optimum);
    let profile = |delta: f64| -> f64 {
        let fixed = FixedParameter::new(objective, index, nominal + delta);
        if free_start.is_empty() {
            fixed.value(&free_start)
        } else {
            powell::minimize_n(|q| fixed.value(q), &free_start, &config.powell).value
        }
    };

    // first guess: crossing along the parameter's axis, others held fixed
    let along_axis = |t: f64| {
        let mut p = optimum.clone();
        p[index] = nominal + t;
        (objective.value(&p) - target).abs()
    };
    let br = bracket(&along_axis, 0.0, 0.01 * scale);
    let axis_min = powell::minimize(&along_axis, br.a, br.b, br.c, &config.brent);

    let mut sig = axis_min.x.abs() / 10.0;
    if !(sig.is_finite() && sig > 0.0) {
        sig = 1e-3 * scale;
    }
    sig *= direction;

    let mut chi = profile(sig);
    let mut shrinks = 0;
    while chi > target && shrinks < config.error_growth_steps {
        sig /= 10.0;
        chi = profile(sig);
        shrinks += 1;
    }

    // grow tenfold while the profile stays below the target
    let mut last_chi = chi;
    let mut grown = 0;
    while chi <= target && grown < config.error_growth_steps {
        last_chi = chi;
        sig *= 10.0;
        chi = profile(sig);
        grown += 1;
    }
    if chi > target {
        sig /= 10.0;
    } else {
        last_chi = chi;
    }
    log::debug!(
        "profile: parameter {} crosses between {:e} and {:e}",
        index,
        sig,
        sig * 10.0
    );

    // linear steps to locate the crossing
    let mut chi3 = last_chi;
    for i in 2..=config.error_linear_steps.max(2) {
        let chi1 = chi3;
        let i = i as f64;
        chi3 = profile(sig * i);
        if chi3 > target {
            let x1 = sig * (i - 1.0);
            let x2 = sig * (i - 0.5);
            let x3 = sig * i;
            let chi2 = profile(x2);
            return quadratic_crossing([x1, x2, x3], [chi1, chi2, chi3], target, direction);
        }
    }

    let last = (sig * config.error_linear_steps.max(2) as f64).abs();
    log::warn!(
        "profile: chi-square of parameter {} never reached {:e}; reporting {:e}",
        index,
        target,
        last
    );
    last
}

/// Root of the quadratic through `(x, chi)` at `chi = target`, as a magnitude.
///
/// `direction` picks the branch on the side of the search. Falls back to
/// linear interpolation between the outer points when the quadratic is
/// degenerate or never reaches the target.
fn quadratic_crossing(x: [f64; 3], chi: [f64; 3], target: f64, direction: f64) -> f64 {
    let [x1, x2, x3] = x;
    let [c1, c2, c3] = chi;
    let den = (x1 - x2) * (x1 - x3) * (x2 - x3);

    // chi(x) = e1 + e2 x + e3 x²
    let e1 = (c3 * x1 * (x1 - x2) * x2 + x3 * (c1 * x2 * (x2 - x3) + c2 * x1 * (x3 - x1))) / den;
    let e2 = (c3 * (x2 * x2 - x1 * x1) + c2 * (x1 * x1 - x3 * x3) + c1 * (x3 * x3 - x2 * x2)) / den;
    let e3 = (c3 * (x1 - x2) + c1 * (x2 - x3) + c2 * (x3 - x1)) / den;

    let disc = e2 * e2 + 4.0 * e3 * (target - e1);
    if e3 != 0.0 && disc >= 0.0 {
        let root = ((-e2 + direction * disc.sqrt()) / (2.0 * e3)).abs();
        if root.is_finite() {
            return root;
        }
    }

    (x1 + (target - c1) * (x3 - x1) / (c3 - c1)).abs()
}
