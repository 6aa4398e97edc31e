//! Powell's direction-set method.
//!
//! Each outer iteration line-minimizes along every direction of the current
//! set, then tries the overall displacement of the iteration as a new
//! direction, replacing the direction of largest decrease when the
//! extrapolation test says the set stays well conditioned.

use ndarray::{Array1, Array2};
use std::fmt;

use super::bracket::bracket;
use super::brent::minimize;
use super::config::{FitConfig, PowellConfig};
use super::convergence::{fractional_converged, ConvergenceStatus};

/// Result of a Powell minimization.
#[derive(Debug, Clone)]
pub struct PowellResult {
    /// Parameters at the minimum
    pub parameters: Array1<f64>,

    /// Objective value at the minimum
    pub value: f64,

    /// Number of outer iterations performed
    pub iterations: usize,

    /// Why the optimizer stopped
    pub status: ConvergenceStatus,

    /// Objective value at the start and after every outer iteration
    pub history: Vec<f64>,
}

impl fmt::Display for PowellResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Powell Result:")?;
        writeln!(f, "  Status: {}", self.status.description())?;
        writeln!(f, "  Value: {:.6e}", self.value)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Parameters: {:?}", self.parameters)?;
        Ok(())
    }
}

/// Outcome of one line minimization.
struct LineStep {
    point: Array1<f64>,
    value: f64,
    displacement: Array1<f64>,
}

/// Minimize `f` from `point` along `direction`.
///
/// The bracket starts at `t = 0` and `t = initial_step`; the returned
/// displacement is `t_min · direction`.
fn line_minimize<F>(f: &F, point: &Array1<f64>, direction: &Array1<f64>, config: &PowellConfig) -> LineStep
where
    F: Fn(&Array1<f64>) -> f64,
{
    let along = |t: f64| f(&(point + &(direction * t)));
    let br = bracket(&along, 0.0, config.initial_step);
    let min = minimize(&along, br.a, br.b, br.c, &config.line);

    let displacement = direction * min.x;
    LineStep {
        point: point + &displacement,
        value: min.fx,
        displacement,
    }
}

/// Minimize `f` starting from `start` with an identity direction set.
///
/// The objective never increases between outer iterations. On hitting the
/// iteration cap, or when the cancellation flag is raised, the current point
/// is returned with the corresponding status.
pub fn minimize_n<F>(f: F, start: &Array1<f64>, config: &PowellConfig) -> PowellResult
where
    F: Fn(&Array1<f64>) -> f64,
{
    let n = start.len();
    let mut p = start.clone();
    let mut fret = f(&p);
    let mut history = vec![fret];

    if n == 0 {
        return PowellResult {
            parameters: p,
            value: fret,
            iterations: 0,
            status: ConvergenceStatus::Converged,
            history,
        };
    }

    let mut xi = Array2::<f64>::eye(n);
    let mut pt = p.clone();

    for iter in 1..=config.max_iterations {
        if config.is_cancelled() {
            log::debug!("powell: cancelled before iteration {}", iter);
            return PowellResult {
                parameters: p,
                value: fret,
                iterations: iter - 1,
                status: ConvergenceStatus::Cancelled,
                history,
            };
        }

        let fp = fret;
        let mut ibig = 0;
        let mut del = 0.0;

        for i in 0..n {
            let direction = xi.column(i).to_owned();
            let fptt = fret;
            let step = line_minimize(&f, &p, &direction, config);
            p = step.point;
            fret = step.value;
            xi.column_mut(i).assign(&step.displacement);

            if fptt - fret > del {
                del = fptt - fret;
                ibig = i;
            }
        }

        history.push(fret);
        log::debug!("powell: iteration {} value {:.10e}", iter, fret);

        if fractional_converged(fp, fret, config.tolerance) {
            return PowellResult {
                parameters: p,
                value: fret,
                iterations: iter,
                status: ConvergenceStatus::Converged,
                history,
            };
        }

        // extrapolated point and average direction of this iteration
        let ptt = &p * 2.0 - &pt;
        let xit = &p - &pt;
        pt = p.clone();
        let fptt = f(&ptt);

        if fptt < fp {
            let t = 2.0 * (fp - 2.0 * fret + fptt) * (fp - fret - del).powi(2)
                - del * (fp - fptt).powi(2);
            if t < 0.0 {
                let step = line_minimize(&f, &p, &xit, config);
                p = step.point;
                fret = step.value;
                let last = xi.column(n - 1).to_owned();
                xi.column_mut(ibig).assign(&last);
                xi.column_mut(n - 1).assign(&step.displacement);
            }
        }
    }

    log::debug!("powell: iteration cap {} reached", config.max_iterations);
    PowellResult {
        parameters: p,
        value: fret,
        iterations: config.max_iterations,
        status: ConvergenceStatus::MaxIterationsReached,
        history,
    }
}

/// Run `config.restarts` Powell passes, each starting from the previous
/// optimum with a fresh identity direction set.
///
/// Iterations are summed and histories concatenated across passes.
pub fn refine<F>(f: F, start: &Array1<f64>, config: &FitConfig) -> PowellResult
where
    F: Fn(&Array1<f64>) -> f64,
{
    let passes = config.restarts.max(1);
    let mut result = minimize_n(&f, start, &config.powell);

    for pass in 1..passes {
        if result.status == ConvergenceStatus::Cancelled {
            break;
        }
        log::debug!("powell: restart {} from value {:.10e}", pass, result.value);
        let next = minimize_n(&f, &result.parameters, &config.powell);

        let mut history = std::mem::take(&mut result.history);
        history.extend(next.history.into_iter().skip(1));
        result = PowellResult {
            iterations: result.iterations + next.iterations,
            history,
            ..next
        };
    }

    result
}
