//! Shared "fit pipeline" logic used by both subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! simulate -> magnitudes to intensity -> peak window -> fit -> (bootstrap) -> residuals

use tracing::info;

use crate::data::generate_event;
use crate::domain::{LightCurveSample, PeakSense, RunConfig};
use crate::error::AppError;
use crate::fit::{bootstrap, fit_parabola, isolate_peak};
use crate::report::{BootstrapReport, PointResidual, RunReport, compute_residuals};

/// All computed outputs of a single `ulens` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: RunReport,
    pub window: LightCurveSample,
    pub residuals: Vec<PointResidual>,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, AppError> {
    let sim = &config.simulation;

    // 1) Simulate survey photometry.
    let series = generate_event(sim)?;

    // 2) Fit in intensity space, where the peak is a maximum.
    let sample = series.to_intensity(sim.baseline_mag)?;
    let window = isolate_peak(&sample, config.window_before, config.window_after, PeakSense::Maximum)?;
    let window_t_range = match (window.t().first(), window.t().last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Err(AppError::new(2, "Peak window is empty.")),
    };
    info!(
        total = sample.len(),
        window = window.len(),
        t_lo = window_t_range.0,
        t_hi = window_t_range.1,
        "peak window selected"
    );

    // 3) Single fit.
    let fit = fit_parabola(&window, sim.f_bl)?;
    info!(chi2_red = fit.chi2_red, p_value = fit.p_value, valid = fit.estimate.is_valid(), "parabolic fit");

    // 4) Optional bootstrap.
    let boot = match &config.bootstrap {
        Some(boot_cfg) => Some(BootstrapReport::from(&bootstrap(&window, sim.f_bl, boot_cfg)?)),
        None => None,
    };

    let residuals = compute_residuals(&window, &fit);

    Ok(RunOutput {
        report: RunReport {
            simulation: sim.clone(),
            total_points: sample.len(),
            window_points: window.len(),
            window_t_range,
            fit,
            bootstrap: boot,
        },
        window,
        residuals,
    })
}
