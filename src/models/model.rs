//! Point-lens point-source (PSPL) model relations.
//!
//! The fitter relies on a handful of primitive conversions:
//! - impact parameter `u` ↔ amplification `A`
//! - amplification `A` ↔ observed intensity `I` for a blending fraction `f_bl`
//! - the rectilinear trajectory `u(t)`
//!
//! All functions are pure and elementwise.

use crate::domain::MicrolensingParams;

/// Amplification at `u = 1`, i.e. `3/√5`. Conventional boundary of an "event".
pub const EVENT_THRESHOLD_AMPLIFICATION: f64 = 1.341_640_786_499_873_8;

/// `A(u) = (u² + 2) / (u·√(u² + 4))`, defined for `u > 0`.
pub fn amplification(u: f64) -> f64 {
    let u2 = u * u;
    (u2 + 2.0) / (u * (u2 + 4.0).sqrt())
}

/// Exact inverse of [`amplification`]: `u² = 2·(A/√(A² − 1) − 1)`.
///
/// Evaluated as `u² = 2 / (s·(A + s))` with `s = √(A² − 1)`, which avoids the
/// cancellation of the direct form at high amplification.
///
/// Returns `None` for `A <= 1` and when `u` underflows to zero.
pub fn impact_parameter_from_amplification(amp: f64) -> Option<f64> {
    if !(amp > 1.0) {
        return None;
    }
    let s = (amp * amp - 1.0).sqrt();
    let u = (2.0 / (s * (amp + s))).sqrt();
    (u.is_finite() && u > 0.0).then_some(u)
}

/// Observed intensity relative to baseline: `I = f_bl·A + (1 − f_bl)`.
pub fn intensity(amp: f64, f_bl: f64) -> f64 {
    f_bl * amp + (1.0 - f_bl)
}

/// Inverse of [`intensity`]. Callers must guard `f_bl != 0`.
pub fn amplification_from_intensity(intensity: f64, f_bl: f64) -> f64 {
    (intensity - (1.0 - f_bl)) / f_bl
}

/// `u(t) = √(u_min² + ((t − t₀)/τ)²)`.
pub fn u_of_time(t: f64, t0: f64, u_min: f64, tau: f64) -> f64 {
    let x = (t - t0) / tau;
    (u_min * u_min + x * x).sqrt()
}

/// Theoretical intensity of a single-lens event at time `t`.
pub fn model_intensity(t: f64, params: &MicrolensingParams, f_bl: f64) -> f64 {
    let u = u_of_time(t, params.t0, params.u_min, params.tau);
    intensity(amplification(u), f_bl)
}
