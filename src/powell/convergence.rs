//! Termination states shared by the iterative solvers.

use serde::{Deserialize, Serialize};

/// Why an iterative solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The tolerance test was met.
    Converged,

    /// The iteration cap was hit; the best point found is returned.
    MaxIterationsReached,

    /// The cancellation flag was raised between outer iterations.
    Cancelled,
}

impl ConvergenceStatus {
    /// Returns true if the solver met its tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceStatus::Converged)
    }

    /// Returns a description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::Converged => "Converged: tolerance reached",
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum iterations reached",
            ConvergenceStatus::Cancelled => "Terminated: cancelled",
        }
    }
}

/// Fractional convergence test `2|a − b| ≤ tol·(|a| + |b|) + TINY`.
///
/// The `TINY` floor lets objectives that converge to exactly zero terminate.
pub fn fractional_converged(previous: f64, current: f64, tolerance: f64) -> bool {
    const TINY: f64 = 1.0e-20;
    2.0 * (previous - current).abs() <= tolerance * (previous.abs() + current.abs()) + TINY
}
