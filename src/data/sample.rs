//! Synthetic single-lens event generation.
//!
//! Produces survey-style photometry: irregular sampling times, magnitudes from
//! the theoretical light curve, and Gaussian magnitude noise.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{MagnitudeSeries, MicrolensingParams, SimulationConfig};
use crate::error::FitError;
use crate::fit::validate_blending;
use crate::models::{flux_to_magnitude, model_intensity};

pub fn generate_event(config: &SimulationConfig) -> Result<MagnitudeSeries, FitError> {
    if config.n_points == 0 {
        return Err(FitError::InvalidConfig("Point count must be > 0.".into()));
    }
    if !(config.t_start.is_finite() && config.t_end.is_finite() && config.t_end > config.t_start) {
        return Err(FitError::InvalidConfig(format!(
            "Invalid time range: start={}, end={} (must be finite and end>start).",
            config.t_start, config.t_end
        )));
    }
    if !(config.u_min.is_finite() && config.u_min > 0.0) {
        return Err(FitError::InvalidConfig("u_min must be finite and > 0.".into()));
    }
    if !(config.tau.is_finite() && config.tau > 0.0) {
        return Err(FitError::InvalidConfig("tau must be finite and > 0.".into()));
    }
    if !(config.mag_err.is_finite() && config.mag_err > 0.0) {
        return Err(FitError::InvalidConfig("Magnitude error must be finite and > 0.".into()));
    }
    validate_blending(config.f_bl)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.mag_err)
        .map_err(|e| FitError::InvalidConfig(format!("Noise distribution error: {e}")))?;

    let params = MicrolensingParams {
        t0: config.t0,
        u_min: config.u_min,
        tau: config.tau,
    };

    let mut t: Vec<f64> = (0..config.n_points)
        .map(|_| rng.gen_range(config.t_start..=config.t_end))
        .collect();
    t.sort_by(|a, b| a.total_cmp(b));

    let mag = t
        .iter()
        .map(|&ti| {
            let clean = flux_to_magnitude(model_intensity(ti, &params, config.f_bl), config.baseline_mag);
            clean + noise.sample(&mut rng)
        })
        .collect();

    Ok(MagnitudeSeries {
        mag_err: vec![config.mag_err; t.len()],
        t,
        mag,
    })
}
