//! Weighted parabolic fit of a light-curve peak.
//!
//! Given:
//! - times `t_i`
//! - intensities `y_i` (peak is a maximum)
//! - uncertainties `σ_i`
//! - a fixed blending fraction `f_bl`
//!
//! we solve, in a centered time basis:
//! - the weighted linear least-squares problem for `y ≈ a·t² + b·t + c`
//! - the covariance of `(a, b, c)`, mapped back to the original basis
//! - χ², reduced χ² and the χ² survival p-value
//!
//! and then convert the parabola into `(t₀, u_min, τ)` when it describes a
//! physical brightening.

use nalgebra::{Matrix3, Vector3};
use tracing::debug;

use crate::domain::{
    InvalidReason, LightCurveSample, MicrolensingParams, Parabola, ParabolicFitResult,
    PhysicalEstimate,
};
use crate::error::FitError;
use crate::math::{centered_design, chi2_survival, mean, solve_weighted_least_squares, uncentering_jacobian};
use crate::models::{
    EVENT_THRESHOLD_AMPLIFICATION, amplification_from_intensity,
    impact_parameter_from_amplification, intensity,
};

/// Number of fitted coefficients.
const N_PARAMS: usize = 3;

/// Check `f_bl ∈ (0, 1]`.
pub fn validate_blending(f_bl: f64) -> Result<(), FitError> {
    if f_bl.is_finite() && f_bl > 0.0 && f_bl <= 1.0 {
        Ok(())
    } else {
        Err(FitError::InvalidBlending(f_bl))
    }
}

/// Fit a parabola to `sample` and derive microlensing parameters.
///
/// Errors on precondition violations only (`n ≤ 3`, bad `f_bl`). A parabola
/// with no physical interpretation is returned with
/// [`PhysicalEstimate::Invalid`].
pub fn fit_parabola(sample: &LightCurveSample, f_bl: f64) -> Result<ParabolicFitResult, FitError> {
    validate_blending(f_bl)?;
    let n = sample.len();
    if n <= N_PARAMS {
        return Err(FitError::TooFewPoints { n });
    }
    fit_unchecked(sample, f_bl)
}

/// Fit without re-validating preconditions; used by the bootstrap hot loop.
pub(crate) fn fit_unchecked(sample: &LightCurveSample, f_bl: f64) -> Result<ParabolicFitResult, FitError> {
    let t = sample.t();
    let y = sample.y();
    let n = t.len();

    let center = mean(t);
    let design = centered_design(t, center);
    let weights: Vec<f64> = sample.y_err().iter().map(|e| 1.0 / (e * e)).collect();

    let solution = solve_weighted_least_squares(&design, y, &weights)?;

    let p_centered = Vector3::new(solution.params[0], solution.params[1], solution.params[2]);
    let cov_centered: Matrix3<f64> = solution.covariance.fixed_view::<3, 3>(0, 0).into_owned();

    let jac = uncentering_jacobian(center);
    let p = jac * p_centered;
    let covariance = jac * cov_centered * jac.transpose();
    let std_errors = [
        covariance[(0, 0)].max(0.0).sqrt(),
        covariance[(1, 1)].max(0.0).sqrt(),
        covariance[(2, 2)].max(0.0).sqrt(),
    ];

    let parabola = Parabola {
        a: p[0],
        b: p[1],
        c: p[2],
    };
    let centered = Parabola {
        a: p_centered[0],
        b: p_centered[1],
        c: p_centered[2],
    };

    // Residuals are evaluated in the centered basis to avoid cancellation at large |t|.
    let chi2: f64 = (0..n)
        .map(|i| {
            let r = centered.eval(t[i] - center) - y[i];
            weights[i] * r * r
        })
        .sum();
    let dof = n - N_PARAMS;
    let chi2_red = chi2 / dof as f64;
    let p_value = chi2_survival(chi2, dof);

    let estimate = derive_physical(&centered, center, f_bl);

    Ok(ParabolicFitResult {
        parabola,
        centered,
        center,
        covariance,
        std_errors,
        chi2,
        chi2_red,
        p_value,
        dof,
        n_points: n,
        estimate,
    })
}

/// Convert parabola coefficients into `(t₀, u_min, τ)`.
///
/// `parabola` is expressed in `x = t − origin`; the returned `t₀` is in `t`.
/// Valid only when the parabola opens downward and its peak amplification
/// reaches the `u = 1` threshold. `τ` follows from the time at which the curve
/// falls back to the threshold intensity: there `u = 1`, so
/// `((t_half − t₀)/τ)² = 1 − u_min²`.
pub fn derive_physical(parabola: &Parabola, origin: f64, f_bl: f64) -> PhysicalEstimate {
    let Parabola { a, b, c } = *parabola;
    if !(a < 0.0) {
        debug!(a, "parabola does not open downward");
        return PhysicalEstimate::Invalid(InvalidReason::OpensUpward);
    }

    let Some(x0) = parabola.vertex() else {
        return PhysicalEstimate::Invalid(InvalidReason::NonFinite);
    };
    let peak_amplification = amplification_from_intensity(parabola.eval(x0), f_bl);
    if !(peak_amplification >= EVENT_THRESHOLD_AMPLIFICATION) {
        debug!(peak_amplification, "peak below event threshold");
        return PhysicalEstimate::Invalid(InvalidReason::BelowEventThreshold { peak_amplification });
    }

    let Some(u_min) = impact_parameter_from_amplification(peak_amplification) else {
        return PhysicalEstimate::Invalid(InvalidReason::NonFinite);
    };

    // Root of a·x² + b·x + (c − I_thr); with a < 0 and a peak above the
    // threshold the discriminant is non-negative.
    let threshold = intensity(EVENT_THRESHOLD_AMPLIFICATION, f_bl);
    let disc = b * b - 4.0 * a * (c - threshold);
    let x_half = (-b + disc.max(0.0).sqrt()) / (2.0 * a);
    let tau = (x_half - x0).abs() / (1.0 - u_min * u_min).sqrt();
    let t0 = origin + x0;

    if !(t0.is_finite() && u_min.is_finite() && tau.is_finite() && tau > 0.0) {
        debug!(t0, u_min, tau, "non-finite physical parameters");
        return PhysicalEstimate::Invalid(InvalidReason::NonFinite);
    }

    PhysicalEstimate::Valid(MicrolensingParams { t0, u_min, tau })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MicrolensingParams;
    use crate::models::{amplification, model_intensity};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn sample_from(t: Vec<f64>, f: impl Fn(f64) -> f64, sigma: f64) -> LightCurveSample {
        let y = t.iter().map(|&ti| f(ti)).collect();
        let y_err = vec![sigma; t.len()];
        LightCurveSample::new(t, y, y_err).unwrap()
    }

    #[test]
    fn exact_downward_parabola_is_recovered() {
        let truth = Parabola { a: -0.5, b: 0.0, c: 2.0 };
        let s = sample_from(vec![-2.0, -1.0, 0.0, 1.0, 2.0], |t| truth.eval(t), 0.05);
        let fit = fit_parabola(&s, 1.0).unwrap();

        assert_abs_diff_eq!(fit.parabola.a, -0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.parabola.b, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.parabola.c, 2.0, epsilon = 1e-10);
        assert_eq!(fit.dof, 2);
        assert_abs_diff_eq!(fit.chi2_red, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.p_value, 1.0, epsilon = 1e-9);
        assert!(fit.std_errors.iter().all(|e| e.is_finite() && *e > 0.0));

        // Peak intensity 2 with f_bl = 1 is A_max = 2.
        let params = fit.estimate.params().copied().unwrap();
        let u_min = (2.0 * (2.0 / 3.0_f64.sqrt() - 1.0)).sqrt();
        let t_half = (2.0 * (2.0 - EVENT_THRESHOLD_AMPLIFICATION)).sqrt();
        assert_abs_diff_eq!(params.t0, 0.0, epsilon = 1e-10);
        assert_relative_eq!(params.u_min, u_min, max_relative = 1e-9);
        assert_relative_eq!(params.tau, t_half / (1.0 - u_min * u_min).sqrt(), max_relative = 1e-9);
        assert_relative_eq!(amplification(params.u_min), 2.0, max_relative = 1e-9);
    }

    #[test]
    fn upward_parabola_is_invalid() {
        let s = LightCurveSample::new(
            vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            vec![0.9, 0.6, 0.2, 0.6, 0.9],
            vec![0.05; 5],
        )
        .unwrap();
        let fit = fit_parabola(&s, 1.0).unwrap();
        assert!(fit.parabola.a > 0.0);
        assert_eq!(fit.estimate, PhysicalEstimate::Invalid(InvalidReason::OpensUpward));
        assert!(fit.chi2_red > 0.0);
        assert!(fit.p_value >= 0.0 && fit.p_value <= 1.0);
    }

    #[test]
    fn tall_upward_parabola_is_still_invalid() {
        let s = sample_from(vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0], |t| 50.0 + t * t, 0.1);
        let fit = fit_parabola(&s, 1.0).unwrap();
        assert_eq!(fit.estimate, PhysicalEstimate::Invalid(InvalidReason::OpensUpward));
    }

    #[test]
    fn shallow_peak_is_below_threshold() {
        let s = sample_from(vec![-2.0, -1.0, 0.0, 1.0, 2.0], |t| 1.2 - 0.01 * t * t, 0.01);
        let fit = fit_parabola(&s, 1.0).unwrap();
        match fit.estimate {
            PhysicalEstimate::Invalid(InvalidReason::BelowEventThreshold { peak_amplification }) => {
                assert_relative_eq!(peak_amplification, 1.2, max_relative = 1e-9);
            }
            other => panic!("expected threshold failure, got {other:?}"),
        }
    }

    #[test]
    fn blending_lowers_inferred_amplification() {
        // Peak intensity 1.6: A_max = 1.6 unblended, but (1.6 - 0.5) / 0.5 = 2.2 at f_bl = 0.5.
        let s = sample_from(vec![-2.0, -1.0, 0.0, 1.0, 2.0], |t| 1.6 - 0.05 * t * t, 0.01);
        let unblended = fit_parabola(&s, 1.0).unwrap().estimate.params().copied().unwrap();
        let blended = fit_parabola(&s, 0.5).unwrap().estimate.params().copied().unwrap();
        assert!(blended.u_min < unblended.u_min);
        assert_relative_eq!(amplification(blended.u_min), 2.2, max_relative = 1e-9);
    }

    #[test]
    fn blended_half_width_uses_blended_threshold_intensity() {
        // Peak intensity 1.25 at f_bl = 0.5 is A_max = 1.5, yet it sits below
        // the unblended 3/√5; the half-width must be taken at I(3/√5, 0.5).
        let s = sample_from(vec![-2.0, -1.0, 0.0, 1.0, 2.0], |t| 1.25 - 0.01 * t * t, 0.01);
        let fit = fit_parabola(&s, 0.5).unwrap();
        assert!(1.25 < EVENT_THRESHOLD_AMPLIFICATION);

        let p = fit.estimate.params().copied().unwrap();
        assert_abs_diff_eq!(p.t0, 0.0, epsilon = 1e-10);
        assert_relative_eq!(amplification(p.u_min), 1.5, max_relative = 1e-9);
        assert_relative_eq!(p.u_min, 0.826_608, max_relative = 1e-5);
        assert_relative_eq!(p.tau, 5.0, max_relative = 1e-9);
    }

    #[test]
    fn centering_invariance_under_time_shift() {
        let t: Vec<f64> = (0..25).map(|i| -3.0 + 0.25 * i as f64).collect();
        // Deterministic "noise" so χ² is non-trivial.
        let noisy = |ti: f64| 3.0 - 0.2 * ti * ti + 0.1 * ti + 0.02 * (7.0 * ti).sin();
        let s0 = sample_from(t.clone(), noisy, 0.02);

        let shift = 2_457_000.0;
        let t_shifted: Vec<f64> = t.iter().map(|v| v + shift).collect();
        let s1 = LightCurveSample::new(t_shifted, s0.y().to_vec(), s0.y_err().to_vec()).unwrap();

        let f0 = fit_parabola(&s0, 1.0).unwrap();
        let f1 = fit_parabola(&s1, 1.0).unwrap();

        assert_relative_eq!(f0.chi2_red, f1.chi2_red, max_relative = 1e-6);
        assert_relative_eq!(f0.p_value, f1.p_value, max_relative = 1e-6);
        assert_relative_eq!(f0.parabola.a, f1.parabola.a, max_relative = 1e-6);
        for &ti in &[-2.0, 0.0, 1.5] {
            assert_relative_eq!(f0.predict(ti), f1.predict(ti + shift), max_relative = 1e-6);
        }

        let p0 = f0.estimate.params().copied().unwrap();
        let p1 = f1.estimate.params().copied().unwrap();
        assert_relative_eq!(p0.t0 + shift, p1.t0, max_relative = 1e-9);
        assert_relative_eq!(p0.u_min, p1.u_min, max_relative = 1e-6);
        assert_relative_eq!(p0.tau, p1.tau, max_relative = 1e-4);
    }

    #[test]
    fn near_peak_pspl_gives_plausible_parameters() {
        let truth = MicrolensingParams { t0: 5000.0, u_min: 0.1, tau: 20.0 };
        let t: Vec<f64> = (0..41).map(|i| 4998.0 + 0.1 * i as f64).collect();
        let s = sample_from(t, |ti| model_intensity(ti, &truth, 1.0), 0.01);
        let fit = fit_parabola(&s, 1.0).unwrap();
        let p = fit.estimate.params().copied().unwrap();
        assert_abs_diff_eq!(p.t0, 5000.0, epsilon = 1e-6);
        // The parabola flattens the cusp slightly, so u_min is only approximate.
        assert!(p.u_min > 0.05 && p.u_min < 0.2, "u_min={}", p.u_min);
        assert!(p.tau > 0.0);
    }

    #[test]
    fn preconditions_are_rejected() {
        let s = sample_from(vec![0.0, 1.0, 2.0], |t| t, 0.1);
        assert_eq!(fit_parabola(&s, 1.0).unwrap_err(), FitError::TooFewPoints { n: 3 });

        let s = sample_from(vec![0.0, 1.0, 2.0, 3.0], |t| t, 0.1);
        assert_eq!(fit_parabola(&s, 0.0).unwrap_err(), FitError::InvalidBlending(0.0));
        assert!(fit_parabola(&s, 1.5).is_err());
        assert!(fit_parabola(&s, 0.3).is_ok());
    }

    #[test]
    fn repeated_times_do_not_error() {
        // Only two distinct times: rank-deficient, absorbed by the pseudo-inverse.
        let s = sample_from(vec![0.0, 0.0, 1.0, 1.0, 1.0], |t| 1.0 + t, 0.1);
        let fit = fit_parabola(&s, 1.0).unwrap();
        assert!(fit.parabola.a.is_finite());
        assert!(fit.chi2.is_finite());
    }
}
