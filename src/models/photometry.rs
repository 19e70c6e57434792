//! Magnitude ↔ flux conversions.

use crate::domain::{LightCurveSample, MagnitudeSeries};
use crate::error::FitError;

/// `F = 10^(-0.4·(m − m_base))`, flux relative to the baseline magnitude.
pub fn magnitude_to_flux(mag: f64, mag_base: f64) -> f64 {
    10f64.powf(-0.4 * (mag - mag_base))
}

/// `m = -2.5·log10(F) + m_base`.
pub fn flux_to_magnitude(flux: f64, mag_base: f64) -> f64 {
    -2.5 * flux.log10() + mag_base
}

/// First-order propagation of a magnitude error into relative flux.
pub fn flux_error_from_magnitude(mag: f64, mag_err: f64, mag_base: f64) -> f64 {
    (-0.4 * std::f64::consts::LN_10 * magnitude_to_flux(mag, mag_base) * mag_err).abs()
}

impl MagnitudeSeries {
    /// Convert to an intensity sample normalised to `mag_base`.
    pub fn to_intensity(&self, mag_base: f64) -> Result<LightCurveSample, FitError> {
        if self.mag.len() != self.t.len() || self.mag_err.len() != self.t.len() {
            return Err(FitError::LengthMismatch {
                t: self.t.len(),
                y: self.mag.len(),
                y_err: self.mag_err.len(),
            });
        }
        let y = self.mag.iter().map(|&m| magnitude_to_flux(m, mag_base)).collect();
        let y_err = self
            .mag
            .iter()
            .zip(&self.mag_err)
            .map(|(&m, &e)| flux_error_from_magnitude(m, e, mag_base))
            .collect();
        LightCurveSample::new(self.t.clone(), y, y_err)
    }
}
