//! Parallel fitting of independent data sets.
//!
//! A fit session is single-threaded and self-contained, so many sessions can
//! run side by side. Each data set gets its own session; results come back in
//! input order.

use rayon::prelude::*;

use crate::data::SampleSource;
use crate::error::Result;
use crate::fit::{FitResult, FitSession};
use crate::model::Model;
use crate::powell::FitConfig;

/// Fit the same model to every source in parallel.
///
/// # Arguments
///
/// * `model` - The model to fit, shared by all sessions
/// * `sources` - One sample source per fit
/// * `config` - Optimizer and error search settings, cloned per session
///
/// # Returns
///
/// * One result per source, in the order of `sources`. A failing fit does not
///   affect the others.
pub fn fit_batch<M, S>(model: &M, sources: &[S], config: &FitConfig) -> Vec<Result<FitResult>>
where
    M: Model + Sync + ?Sized,
    S: SampleSource + Sync,
{
    log::debug!("fitting {} data sets in parallel", sources.len());
    sources
        .par_iter()
        .map(|source| {
            FitSession::builder(model)
                .with_config(config.clone())
                .generate_fit(source)
                .map(|session| session.result())
        })
        .collect()
}
