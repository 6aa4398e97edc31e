//! Sample sources and the snapshot a fit works on.
//!
//! A [`SampleSource`] is whatever owns the measured points (a table, a plot
//! curve, a file). At the start of a fit the engine copies the usable samples
//! into a [`RealData`] snapshot so later edits to the source cannot disturb the
//! fit in progress.

use serde::{Deserialize, Serialize};

/// A single measured point with symmetric 1σ uncertainties.
///
/// An error of `0` means "unknown". When both errors of a sample are zero the
/// chi-square objective weights the point as if `y_err` were `1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Independent variable
    pub x: f64,
    /// Dependent variable
    pub y: f64,
    /// 1σ uncertainty on x
    pub x_err: f64,
    /// 1σ uncertainty on y
    pub y_err: f64,
}

impl Sample {
    /// Create a sample without measurement errors.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            x_err: 0.0,
            y_err: 0.0,
        }
    }

    /// Create a sample carrying both x and y errors.
    pub fn with_errors(x: f64, y: f64, x_err: f64, y_err: f64) -> Self {
        Self { x, y, x_err, y_err }
    }

    /// The y error, or `1` when neither error is known.
    pub fn effective_y_err(&self) -> f64 {
        if self.y_err == 0.0 && self.x_err == 0.0 {
            1.0
        } else {
            self.y_err
        }
    }
}

/// An ordered, indexable provider of samples.
///
/// This is the boundary to the application's data layer. The engine only ever
/// reads through it, once, when a fit session is constructed.
pub trait SampleSource {
    /// Number of samples available.
    fn sample_count(&self) -> usize;

    /// The sample at `index`, `0 <= index < sample_count()`.
    fn sample(&self, index: usize) -> Sample;

    /// Whether the samples carry x errors.
    fn has_x_errors(&self) -> bool;

    /// Whether the samples carry y errors.
    fn has_y_errors(&self) -> bool;
}

/// A restriction window; samples outside it are left out of the fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    /// Lower x bound (inclusive)
    pub x_min: f64,
    /// Upper x bound (inclusive)
    pub x_max: f64,
    /// Lower y bound (inclusive)
    pub y_min: f64,
    /// Upper y bound (inclusive)
    pub y_max: f64,
}

impl FitRange {
    /// Create a window; the bounds of each axis may be given in either order.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            x_max: x1.max(x2),
            y_min: y1.min(y2),
            y_max: y1.max(y2),
        }
    }

    /// Whether `sample` lies inside the window.
    pub fn contains(&self, sample: &Sample) -> bool {
        sample.x >= self.x_min
            && sample.x <= self.x_max
            && sample.y >= self.y_min
            && sample.y <= self.y_max
    }
}

/// A plain in-memory sample source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
    has_x_errors: bool,
    has_y_errors: bool,
}

impl SampleSet {
    /// Create a set from x and y values with no measurement errors.
    ///
    /// Extra values in the longer slice are ignored.
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        let samples = x.iter().zip(y).map(|(&x, &y)| Sample::new(x, y)).collect();
        Self {
            samples,
            has_x_errors: false,
            has_y_errors: false,
        }
    }

    /// Create a set from fully specified samples.
    ///
    /// The error flags are set if any sample carries a non-zero error.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let has_x_errors = samples.iter().any(|s| s.x_err != 0.0);
        let has_y_errors = samples.iter().any(|s| s.y_err != 0.0);
        Self {
            samples,
            has_x_errors,
            has_y_errors,
        }
    }

    /// Attach y errors, one per sample.
    pub fn with_y_errors(mut self, y_err: &[f64]) -> Self {
        for (sample, &err) in self.samples.iter_mut().zip(y_err) {
            sample.y_err = err;
        }
        self.has_y_errors = true;
        self
    }

    /// Attach x errors, one per sample.
    pub fn with_x_errors(mut self, x_err: &[f64]) -> Self {
        for (sample, &err) in self.samples.iter_mut().zip(x_err) {
            sample.x_err = err;
        }
        self.has_x_errors = true;
        self
    }

    /// Append a sample, updating the error flags.
    pub fn push(&mut self, sample: Sample) {
        self.has_x_errors |= sample.x_err != 0.0;
        self.has_y_errors |= sample.y_err != 0.0;
        self.samples.push(sample);
    }

    /// The samples in order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl SampleSource for SampleSet {
    fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn sample(&self, index: usize) -> Sample {
        self.samples[index]
    }

    fn has_x_errors(&self) -> bool {
        self.has_x_errors
    }

    fn has_y_errors(&self) -> bool {
        self.has_y_errors
    }
}

/// The snapshot of valid samples a fit session works on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealData {
    samples: Vec<Sample>,
    has_x_errors: bool,
    has_y_errors: bool,
    x_min: f64,
    x_max: f64,
}

impl RealData {
    /// Copy the samples of `source` that pass `keep`.
    ///
    /// `x_span` is the x interval the fitted curve is defined over; when `None`
    /// the extent of the kept samples is used.
    pub fn snapshot<S, F>(source: &S, x_span: Option<(f64, f64)>, keep: F) -> Self
    where
        S: SampleSource + ?Sized,
        F: Fn(&Sample) -> bool,
    {
        let samples: Vec<Sample> = (0..source.sample_count())
            .map(|i| source.sample(i))
            .filter(|s| keep(s))
            .collect();

        let (x_min, x_max) = x_span.unwrap_or_else(|| {
            samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.x), hi.max(s.x))
            })
        });

        Self {
            samples,
            has_x_errors: source.has_x_errors(),
            has_y_errors: source.has_y_errors(),
            x_min: x_min.min(x_max),
            x_max: x_min.max(x_max),
        }
    }

    /// Build a snapshot directly from samples, taking the error flags from them.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let set = SampleSet::from_samples(samples);
        Self::snapshot(&set, None, |_| true)
    }

    /// The snapshot's samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples in the snapshot.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the snapshot holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the source reported x errors.
    pub fn has_x_errors(&self) -> bool {
        self.has_x_errors
    }

    /// Whether the source reported y errors.
    pub fn has_y_errors(&self) -> bool {
        self.has_y_errors
    }

    /// Whether the source reported any errors at all.
    pub fn has_errors(&self) -> bool {
        self.has_x_errors || self.has_y_errors
    }

    /// The x interval of the fit.
    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Initial step for numerical x-derivatives: one hundredth of the x range.
    pub fn derivative_step(&self) -> f64 {
        let step = (self.x_max - self.x_min) / 100.0;
        if step.is_finite() && step > 0.0 {
            step
        } else {
            1e-3 * self.x_max.abs().max(1.0)
        }
    }
}
