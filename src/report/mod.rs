//! Reporting utilities: residuals, run summaries and formatted terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{
    BootstrapEnsemble, EnsembleSummary, LightCurveSample, ParabolicFitResult, SimulationConfig,
};

/// Residual of one observation against the fitted parabola.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    pub t: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
    /// Residual in units of the point's uncertainty.
    pub pull: f64,
}

/// Bootstrap bookkeeping plus per-parameter summaries.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub trials: usize,
    pub accepted: usize,
    pub rejected_degenerate: usize,
    pub invalid: usize,
    pub summary: EnsembleSummary,
}

impl From<&BootstrapEnsemble> for BootstrapReport {
    fn from(e: &BootstrapEnsemble) -> Self {
        Self {
            trials: e.trials,
            accepted: e.accepted,
            rejected_degenerate: e.rejected_degenerate,
            invalid: e.invalid,
            summary: e.summary(),
        }
    }
}

/// Everything a `ulens` run prints.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub simulation: SimulationConfig,
    pub total_points: usize,
    pub window_points: usize,
    pub window_t_range: (f64, f64),
    pub fit: ParabolicFitResult,
    pub bootstrap: Option<BootstrapReport>,
}

/// Compute fitted values and residuals for each observation.
pub fn compute_residuals(sample: &LightCurveSample, fit: &ParabolicFitResult) -> Vec<PointResidual> {
    sample
        .t()
        .iter()
        .zip(sample.y())
        .zip(sample.y_err())
        .map(|((&t, &y_obs), &err)| {
            let y_fit = fit.predict(t);
            let residual = y_obs - y_fit;
            PointResidual {
                t,
                y_obs,
                y_fit,
                residual,
                pull: residual / err,
            }
        })
        .collect()
}
