//! Configuration options for the Powell optimizer and its 1-D solvers.
//!
//! This module defines the iteration caps, tolerances and restart policy used
//! by the direction-set minimizer, Brent's line minimizer and root finder, and
//! the confidence-interval search built on top of them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for the 1-D Brent minimizer and root finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrentConfig {
    /// Maximum number of iterations. Default: 100
    pub max_iterations: usize,

    /// Fractional tolerance on the abscissa. Default: 1e-10
    pub tolerance: f64,

    /// Absolute tolerance added for minima near zero. Default: 1e-12
    pub zeps: f64,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
            zeps: 1e-12,
        }
    }
}

impl BrentConfig {
    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the fractional tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Configuration for Powell's direction-set method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowellConfig {
    /// Maximum number of outer iterations. Default: 100
    pub max_iterations: usize,

    /// Fractional tolerance on the objective between outer iterations. Default: 1e-10
    pub tolerance: f64,

    /// Second trial point used to start each line bracket. Default: 0.1
    pub initial_step: f64,

    /// Settings for the line minimizations.
    pub line: BrentConfig,

    /// Optional flag polled between outer iterations; when set the optimizer
    /// stops and returns its current point.
    #[serde(skip)]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PowellConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
            initial_step: 0.1,
            line: BrentConfig::default(),
            cancel: None,
        }
    }
}

impl PowellConfig {
    /// Set the maximum number of outer iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the fractional tolerance on the objective.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the initial bracketing step of the line searches.
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Set the line-minimizer configuration.
    pub fn with_line(mut self, line: BrentConfig) -> Self {
        self.line = line;
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Configuration of a whole fit: optimizer, restarts and error search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Powell optimizer settings.
    pub powell: PowellConfig,

    /// Settings for stand-alone 1-D searches (slope refinement, root finding).
    pub brent: BrentConfig,

    /// Number of Powell passes, each restarting from the previous optimum
    /// with a fresh direction set. Default: 3
    pub restarts: usize,

    /// Maximum number of ×10 growth steps in the error search. Default: 20
    pub error_growth_steps: usize,

    /// Maximum number of linear steps in the error search. Default: 10
    pub error_linear_steps: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            powell: PowellConfig::default(),
            brent: BrentConfig::default(),
            restarts: 3,
            error_growth_steps: 20,
            error_linear_steps: 10,
        }
    }
}

impl FitConfig {
    /// Set the Powell optimizer settings.
    pub fn with_powell(mut self, powell: PowellConfig) -> Self {
        self.powell = powell;
        self
    }

    /// Set the stand-alone Brent settings.
    pub fn with_brent(mut self, brent: BrentConfig) -> Self {
        self.brent = brent;
        self
    }

    /// Set the number of Powell passes.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the error-search step limits.
    pub fn with_error_steps(mut self, growth: usize, linear: usize) -> Self {
        self.error_growth_steps = growth;
        self.error_linear_steps = linear;
        self
    }
}
