//! Fit sessions.
//!
//! A [`FitSession`] runs the whole pipeline once, synchronously, when it is
//! built:
//!
//! 1. snapshot the valid samples of the source,
//! 2. take the model's closed-form first guess (or the caller's start values),
//! 3. refine to the chi-square minimum,
//! 4. estimate per-parameter errors when the data carry any,
//! 5. compute the residual series.
//!
//! The finished session is read-only. Changing the data, range or model means
//! building a new session.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::data::{FitRange, RealData, SampleSource};
use crate::error::{FitError, Result};
use crate::model::Model;
use crate::powell::{ConvergenceStatus, FitConfig};

/// Number of points sampled by [`FitSession::y_range`].
const Y_RANGE_STEPS: usize = 100;

/// Pipeline stage reached by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FitStage {
    /// Samples snapshotted, nothing computed yet.
    Constructed,
    /// Start values chosen.
    FirstPassGuessed,
    /// Chi-square minimum found.
    Optimized,
    /// Error search finished (or skipped for data without errors).
    ErrorsEstimated,
    /// Residuals computed; the session is complete.
    ResidualsGenerated,
}

/// One point of the residual series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    /// Sample abscissa
    pub x: f64,
    /// Observed minus fitted value
    pub y: f64,
    /// Error bar of the residual
    pub y_err: f64,
}

/// The outcome of a completed fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Fitted parameters
    pub parameters: Vec<f64>,
    /// 1σ parameter errors, absent when the data carry no errors
    pub errors: Option<Vec<f64>>,
    /// Chi-square at the minimum
    pub chi_square: f64,
    /// Reduced chi-square, or the residual standard deviation without errors
    pub goodness_of_fit: f64,
}

impl FitResult {
    /// Serialize the result to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(FitError::from)
    }

    /// Deserialize a result from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FitError::from)
    }
}

/// Builder for a [`FitSession`] with a range, configuration or start values.
#[derive(Debug, Clone)]
pub struct FitSessionBuilder<M> {
    model: M,
    range: Option<FitRange>,
    config: FitConfig,
    initial: Option<Array1<f64>>,
}

impl<M: Model> FitSessionBuilder<M> {
    /// Restrict the fit to samples inside `range`.
    pub fn with_range(mut self, range: FitRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Use `config` for the optimizer and the error search.
    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the refinement from `parameters` instead of the model's first guess.
    pub fn with_initial_parameters(mut self, parameters: Array1<f64>) -> Self {
        self.initial = Some(parameters);
        self
    }

    /// Run the pipeline against `source`.
    ///
    /// # Errors
    ///
    /// * `Underdetermined` if fewer valid samples than parameters remain
    /// * `DimensionMismatch` if start values of the wrong length were given
    /// * any error of the model's first guess or refinement
    pub fn generate_fit<S: SampleSource + ?Sized>(self, source: &S) -> Result<FitSession<M>> {
        let FitSessionBuilder {
            model,
            range,
            config,
            initial,
        } = self;

        let data = RealData::snapshot(
            source,
            range.map(|r| (r.x_min, r.x_max)),
            |s| range.map_or(true, |r| r.contains(s)) && model.accepts(s),
        );
        let n = model.parameter_count();
        log::debug!(
            "fit: {} of {} samples valid for {} parameters",
            data.len(),
            source.sample_count(),
            n
        );

        if data.len() < n {
            return Err(FitError::Underdetermined {
                samples: data.len(),
                parameters: n,
            });
        }

        let mut session = FitSession {
            parameters: Array1::zeros(n),
            errors: None,
            chi_square: f64::NAN,
            residuals: Vec::new(),
            iterations: 0,
            status: ConvergenceStatus::Converged,
            stage: FitStage::Constructed,
            model,
            data,
            config,
        };

        let start = match initial {
            Some(p) if p.len() != n => {
                return Err(FitError::DimensionMismatch(format!(
                    "expected {} start values, got {}",
                    n,
                    p.len()
                )))
            }
            Some(p) => p,
            None => session.model.initial_guess(&session.data)?,
        };
        session.advance(FitStage::FirstPassGuessed);

        let optimum = session.model.refine(&session.data, &start, &session.config)?;
        session.parameters = optimum.parameters.clone();
        session.chi_square = optimum.chi_square;
        session.iterations = optimum.iterations;
        session.status = optimum.status;
        session.advance(FitStage::Optimized);

        if session.data.has_errors() {
            let errors = session
                .model
                .estimate_errors(&session.data, &optimum, &session.config)?;
            session.errors = Some(errors);
        }
        session.advance(FitStage::ErrorsEstimated);

        session.residuals = session.compute_residuals();
        session.advance(FitStage::ResidualsGenerated);

        Ok(session)
    }
}

/// A completed fit of one model to one snapshot of samples.
#[derive(Debug, Clone)]
pub struct FitSession<M> {
    model: M,
    data: RealData,
    config: FitConfig,
    parameters: Array1<f64>,
    errors: Option<Array1<f64>>,
    chi_square: f64,
    residuals: Vec<Residual>,
    iterations: usize,
    status: ConvergenceStatus,
    stage: FitStage,
}

impl<M: Model> FitSession<M> {
    /// Fit `model` to every sample of `source` with the default configuration.
    pub fn new<S: SampleSource + ?Sized>(model: M, source: &S) -> Result<Self> {
        Self::builder(model).generate_fit(source)
    }

    /// Start configuring a session for `model`.
    pub fn builder(model: M) -> FitSessionBuilder<M> {
        FitSessionBuilder {
            model,
            range: None,
            config: FitConfig::default(),
            initial: None,
        }
    }

    fn advance(&mut self, stage: FitStage) {
        log::debug!("fit: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn compute_residuals(&self) -> Vec<Residual> {
        let step = self.data.derivative_step();
        let mut residuals: Vec<Residual> = self
            .data
            .samples()
            .iter()
            .map(|s| {
                let y_err = if self.data.has_x_errors() {
                    let slope = self.model.derivative(s.x, &self.parameters, step);
                    (s.y_err * s.y_err + slope * slope * s.x_err * s.x_err).sqrt()
                } else {
                    s.y_err
                };
                Residual {
                    x: s.x,
                    y: s.y - self.model.eval(s.x, &self.parameters),
                    y_err,
                }
            })
            .collect();

        // without y errors every residual carries the spread of the residuals
        if !self.data.has_y_errors() {
            let sd = std_dev(residuals.iter().map(|r| r.y));
            for r in &mut residuals {
                r.y_err = sd;
            }
        }
        residuals
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.parameter_count();
        if index < count {
            Ok(())
        } else {
            Err(FitError::ParameterIndex { index, count })
        }
    }

    /// Number of model parameters.
    pub fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    /// Display name of parameter `index`.
    pub fn parameter_name(&self, index: usize) -> Result<String> {
        self.check_index(index)?;
        Ok(self.model.parameter_name(index))
    }

    /// Fitted value of parameter `index`.
    pub fn parameter(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.parameters[index])
    }

    /// 1σ error of parameter `index`.
    ///
    /// Fails with `MissingErrors` when the samples carry neither x nor y errors.
    pub fn parameter_error(&self, index: usize) -> Result<f64> {
        let errors = self.errors.as_ref().ok_or(FitError::MissingErrors)?;
        self.check_index(index)?;
        Ok(errors[index])
    }

    /// All fitted parameters.
    pub fn parameters(&self) -> &Array1<f64> {
        &self.parameters
    }

    /// All parameter errors, if the data carry errors.
    pub fn errors(&self) -> Option<&Array1<f64>> {
        self.errors.as_ref()
    }

    /// Chi-square at the minimum.
    pub fn chi_square(&self) -> f64 {
        self.chi_square
    }

    /// Label of [`goodness_of_fit`](Self::goodness_of_fit).
    pub fn goodness_of_fit_name(&self) -> String {
        if self.data.has_errors() {
            format!("Chi²/(N-{})", self.parameter_count())
        } else {
            "Std dev".to_string()
        }
    }

    /// Reduced chi-square `χ²/(N − n)` when the data carry errors, otherwise
    /// the standard deviation of the residuals.
    ///
    /// With exactly as many samples as parameters the reduced chi-square is
    /// not finite.
    pub fn goodness_of_fit(&self) -> f64 {
        if self.data.has_errors() {
            let dof = self.data.len() as f64 - self.parameter_count() as f64;
            self.chi_square / dof
        } else {
            self.residual_std_dev()
        }
    }

    /// Standard deviation of the residuals.
    pub fn residual_std_dev(&self) -> f64 {
        std_dev(self.residuals.iter().map(|r| r.y))
    }

    /// The fitted curve at `x`.
    pub fn y_value(&self, x: f64) -> f64 {
        self.model.eval(x, &self.parameters)
    }

    /// Minimum and maximum of the fitted curve over `[x_min, x_max]`,
    /// sampled at evenly spaced points.
    pub fn y_range(&self, x_min: f64, x_max: f64) -> (f64, f64) {
        let step = (x_max - x_min) / Y_RANGE_STEPS as f64;
        (0..=Y_RANGE_STEPS)
            .map(|i| self.y_value(x_min + i as f64 * step))
            .filter(|y| y.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            })
    }

    /// The model's formula.
    pub fn function_string(&self) -> String {
        self.model.function_string()
    }

    /// Residual series, one entry per valid sample.
    pub fn residuals(&self) -> &[Residual] {
        &self.residuals
    }

    /// Snapshot of the result.
    pub fn result(&self) -> FitResult {
        FitResult {
            parameters: self.parameters.to_vec(),
            errors: self.errors.as_ref().map(|e| e.to_vec()),
            chi_square: self.chi_square,
            goodness_of_fit: self.goodness_of_fit(),
        }
    }

    /// Stage the pipeline reached.
    pub fn stage(&self) -> FitStage {
        self.stage
    }

    /// Optimizer iterations spent in the refinement.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Why the refinement stopped.
    pub fn status(&self) -> ConvergenceStatus {
        self.status
    }

    /// The samples the fit used.
    pub fn data(&self) -> &RealData {
        &self.data
    }

    /// The fitted model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The configuration the fit ran with.
    pub fn config(&self) -> &FitConfig {
        &self.config
    }
}

/// Sample standard deviation, `0` for fewer than two values.
fn std_dev<I: Iterator<Item = f64> + Clone>(values: I) -> f64 {
    let n = values.clone().count();
    if n < 2 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let ss: f64 = values.map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}
