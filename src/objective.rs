//! The chi-square objective and its restrictions.
//!
//! [`ChiSquare`] scores a parameter vector against a data snapshot using the
//! effective-variance approximation: an x error is folded into the y variance
//! through the local slope of the model,
//!
//! χ²(p) = Σᵢ (yᵢ − f(xᵢ; p))² / (σ_{y,i}² + (f′(xᵢ; p)·σ_{x,i})²)
//!
//! [`FixedParameter`] pins one parameter of another objective so the rest can
//! be re-minimized, as the profile error search requires.

use ndarray::Array1;

use crate::data::RealData;
use crate::model::Model;

/// A scalar function of a parameter vector.
pub trait Objective {
    /// Number of parameters the objective expects.
    fn parameter_count(&self) -> usize;

    /// Value at `parameters`.
    fn value(&self, parameters: &Array1<f64>) -> f64;
}

/// Chi-square of a model against a data snapshot.
pub struct ChiSquare<'a, M: Model + ?Sized> {
    model: &'a M,
    data: &'a RealData,
    step: f64,
}

impl<'a, M: Model + ?Sized> ChiSquare<'a, M> {
    /// Create the objective for `model` over `data`.
    pub fn new(model: &'a M, data: &'a RealData) -> Self {
        Self {
            model,
            data,
            step: data.derivative_step(),
        }
    }

    /// The model being scored.
    pub fn model(&self) -> &M {
        self.model
    }

    /// The data the model is scored against.
    pub fn data(&self) -> &RealData {
        self.data
    }

    /// Effective variance of sample `index` at `parameters`.
    pub fn variance(&self, index: usize, parameters: &Array1<f64>) -> f64 {
        let sample = &self.data.samples()[index];
        let sy = sample.effective_y_err();
        let mut var = sy * sy;

        if self.data.has_x_errors() && sample.x_err != 0.0 {
            let slope = self.model.derivative(sample.x, parameters, self.step);
            var += (slope * sample.x_err).powi(2);
        }

        // x error only, at a point where the curve is flat
        if var > 0.0 {
            var
        } else {
            1.0
        }
    }

    /// Observed minus fitted value at every sample.
    pub fn residuals(&self, parameters: &Array1<f64>) -> Array1<f64> {
        self.data
            .samples()
            .iter()
            .map(|s| s.y - self.model.eval(s.x, parameters))
            .collect()
    }
}

impl<'a, M: Model + ?Sized> Objective for ChiSquare<'a, M> {
    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn value(&self, parameters: &Array1<f64>) -> f64 {
        self.data
            .samples()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let r = s.y - self.model.eval(s.x, parameters);
                r * r / self.variance(i, parameters)
            })
            .sum()
    }
}

/// An objective with one parameter held at a fixed value.
///
/// Takes the `n − 1` free parameters and evaluates the inner objective on the
/// full vector with the fixed value spliced in at `index`.
pub struct FixedParameter<'a, O: Objective + ?Sized> {
    inner: &'a O,
    index: usize,
    value: f64,
}

impl<'a, O: Objective + ?Sized> FixedParameter<'a, O> {
    /// Pin parameter `index` of `inner` to `value`.
    pub fn new(inner: &'a O, index: usize, value: f64) -> Self {
        Self { inner, index, value }
    }

    /// Full parameter vector from the free ones.
    pub fn expand(&self, free: &Array1<f64>) -> Array1<f64> {
        let mut full = Vec::with_capacity(free.len() + 1);
        full.extend(free.iter().take(self.index));
        full.push(self.value);
        full.extend(free.iter().skip(self.index));
        Array1::from_vec(full)
    }

    /// Free parameters of a full vector, dropping the pinned one.
    pub fn reduce(&self, full: &Array1<f64>) -> Array1<f64> {
        full.iter()
            .enumerate()
            .filter(|&(i, _)| i != self.index)
            .map(|(_, &v)| v)
            .collect()
    }
}

impl<'a, O: Objective + ?Sized> Objective for FixedParameter<'a, O> {
    fn parameter_count(&self) -> usize {
        self.inner.parameter_count().saturating_sub(1)
    }

    fn value(&self, free: &Array1<f64>) -> f64 {
        self.inner.value(&self.expand(free))
    }
}
