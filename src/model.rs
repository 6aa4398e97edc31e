//! The model interface.
//!
//! A [`Model`] is a parametric scalar function family `y = f(x; p)` together
//! with the pieces a fit needs from it: a cheap closed-form first guess, an
//! x-derivative for the effective-variance weights, and the refinement and
//! error-estimation steps. The defaults run the generic path (Powell on the
//! chi-square, then the profile error search); models with a cheaper
//! specialised scheme override them.

use ndarray::Array1;

use crate::data::{RealData, Sample};
use crate::error::Result;
use crate::objective::{ChiSquare, Objective};
use crate::powell::{self, ConvergenceStatus, FitConfig, PowellResult};
use crate::uncertainty::profile_errors;
use crate::utils::ridders;

/// The minimum found by a model's refinement step.
#[derive(Debug, Clone)]
pub struct Optimum {
    /// Parameters at the minimum
    pub parameters: Array1<f64>,

    /// Chi-square at the minimum
    pub chi_square: f64,

    /// Optimizer iterations spent (zero for closed-form solutions)
    pub iterations: usize,

    /// Why the refinement stopped
    pub status: ConvergenceStatus,

    /// Parameter errors, for models whose refinement yields them directly
    pub errors: Option<Array1<f64>>,
}

impl From<PowellResult> for Optimum {
    fn from(result: PowellResult) -> Self {
        Self {
            parameters: result.parameters,
            chi_square: result.value,
            iterations: result.iterations,
            status: result.status,
            errors: None,
        }
    }
}

/// A parametric model that can be fit to data.
pub trait Model {
    /// Number of parameters.
    fn parameter_count(&self) -> usize;

    /// Display name of parameter `index`.
    ///
    /// Defaults to `a`, `b`, `c`, ...
    fn parameter_name(&self, index: usize) -> String {
        match u8::try_from(index) {
            Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
            _ => format!("p{}", index),
        }
    }

    /// Human-readable formula, e.g. `y = a e^(b x)`.
    fn function_string(&self) -> String;

    /// Evaluates the model at `x`.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent variable
    /// * `parameters` - The parameter vector, of length `parameter_count()`
    fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64;

    /// The x-derivative `df/dx` at `x`.
    ///
    /// By default the derivative is estimated with Ridders' method starting from
    /// `step`; models with a closed form override this.
    fn derivative(&self, x: f64, parameters: &Array1<f64>, step: f64) -> f64 {
        ridders::derivative(|x| self.eval(x, parameters), x, step).value
    }

    /// Whether `sample` can take part in a fit of this model.
    fn accepts(&self, _sample: &Sample) -> bool {
        true
    }

    /// Closed-form first guess, usually a (linearized) weighted least-squares solve.
    fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>>;

    /// Refine `start` to the chi-square minimum over `data`.
    ///
    /// The default runs `config.restarts` Powell passes.
    fn refine(&self, data: &RealData, start: &Array1<f64>, config: &FitConfig) -> Result<Optimum> {
        let chi = ChiSquare::new(self, data);
        Ok(powell::refine(|p| chi.value(p), start, config).into())
    }

    /// 1σ errors of the parameters at `optimum`.
    ///
    /// Uses the errors computed by `refine` when present, otherwise the
    /// profile chi-square search.
    fn estimate_errors(
        &self,
        data: &RealData,
        optimum: &Optimum,
        config: &FitConfig,
    ) -> Result<Array1<f64>> {
        if let Some(errors) = &optimum.errors {
            return Ok(errors.clone());
        }
        let chi = ChiSquare::new(self, data);
        Ok(profile_errors(&chi, &optimum.parameters, optimum.chi_square, config))
    }
}

macro_rules! forward_model {
    ($($wrapper:ty),*) => {$(
        impl<M: Model + ?Sized> Model for $wrapper {
            fn parameter_count(&self) -> usize {
                (**self).parameter_count()
            }

            fn parameter_name(&self, index: usize) -> String {
                (**self).parameter_name(index)
            }

            fn function_string(&self) -> String {
                (**self).function_string()
            }

            fn eval(&self, x: f64, parameters: &Array1<f64>) -> f64 {
                (**self).eval(x, parameters)
            }

            fn derivative(&self, x: f64, parameters: &Array1<f64>, step: f64) -> f64 {
                (**self).derivative(x, parameters, step)
            }

            fn accepts(&self, sample: &Sample) -> bool {
                (**self).accepts(sample)
            }

            fn initial_guess(&self, data: &RealData) -> Result<Array1<f64>> {
                (**self).initial_guess(data)
            }

            fn refine(
                &self,
                data: &RealData,
                start: &Array1<f64>,
                config: &FitConfig,
            ) -> Result<Optimum> {
                (**self).refine(data, start, config)
            }

            fn estimate_errors(
                &self,
                data: &RealData,
                optimum: &Optimum,
                config: &FitConfig,
            ) -> Result<Array1<f64>> {
                (**self).estimate_errors(data, optimum, config)
            }
        }
    )*};
}

forward_model!(Box<M>, &M);
