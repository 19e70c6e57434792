//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{InvalidReason, ParameterSummary, PhysicalEstimate};
use crate::report::{BootstrapReport, PointResidual, RunReport};

/// Format the full run summary (simulation, window, fit, optional bootstrap).
pub fn format_run_summary(report: &RunReport, residuals: &[PointResidual]) -> String {
    let mut out = String::new();
    let sim = &report.simulation;
    let fit = &report.fit;

    out.push_str("=== ulens - Microlensing Peak Fit ===\n");
    out.push_str(&format!(
        "Simulated: t0={:.3} u_min={:.4} tau={:.3} f_bl={:.3} | n={} | mag_base={:.2} sigma={:.3}mag seed={}\n",
        sim.t0, sim.u_min, sim.tau, sim.f_bl, sim.n_points, sim.baseline_mag, sim.mag_err, sim.seed
    ));
    out.push_str(&format!(
        "Window: {} of {} points | t=[{:.3}, {:.3}]\n",
        report.window_points, report.total_points, report.window_t_range.0, report.window_t_range.1
    ));

    out.push_str("\nParabola (y = a*t^2 + b*t + c):\n");
    for (name, (v, e)) in ["a", "b", "c"]
        .iter()
        .zip(fit.parabola.coefficients().iter().zip(fit.std_errors.iter()))
    {
        out.push_str(&format!("- {name} = {v:.6e} +/- {e:.3e}\n"));
    }
    out.push_str(&format!(
        "- chi2={:.3} dof={} chi2_red={:.3} p={:.4}\n",
        fit.chi2, fit.dof, fit.chi2_red, fit.p_value
    ));
    let max_pull = residuals.iter().map(|r| r.pull.abs()).fold(0.0_f64, f64::max);
    out.push_str(&format!("- max |pull| = {max_pull:.2}\n"));

    out.push_str("\nEvent parameters:\n");
    match &fit.estimate {
        PhysicalEstimate::Valid(p) => {
            out.push_str(&format!("- t0    = {:.4}\n", p.t0));
            out.push_str(&format!("- u_min = {:.5}\n", p.u_min));
            out.push_str(&format!("- tau   = {:.4}\n", p.tau));
        }
        PhysicalEstimate::Invalid(reason) => {
            out.push_str(&format!("- invalid: {}\n", describe_invalid(reason)));
        }
    }

    if let Some(boot) = &report.bootstrap {
        out.push('\n');
        out.push_str(&format_bootstrap(boot));
    }

    out
}

/// Format bootstrap counts and a per-parameter table.
pub fn format_bootstrap(boot: &BootstrapReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Bootstrap: trials={} accepted={} degenerate={} invalid={}\n",
        boot.trials, boot.accepted, boot.rejected_degenerate, boot.invalid
    ));
    out.push_str(
        format!(
            "{:<6} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "param", "n", "mean", "std", "p16", "median", "p84"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format_row("t0", boot.summary.t0.as_ref()));
    out.push_str(&format_row("u_min", boot.summary.u_min.as_ref()));
    out.push_str(&format_row("tau", boot.summary.tau.as_ref()));
    out
}

fn format_row(name: &str, s: Option<&ParameterSummary>) -> String {
    match s {
        Some(s) => format!(
            "{:<6} {:>7} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>12.5}\n",
            name, s.count, s.mean, s.std_dev, s.p16, s.median, s.p84
        ),
        None => format!("{name:<6} {:>7} (no valid estimates)\n", 0),
    }
}

fn describe_invalid(reason: &InvalidReason) -> String {
    match reason {
        InvalidReason::OpensUpward => "parabola opens upward (no brightness maximum)".to_string(),
        InvalidReason::BelowEventThreshold { peak_amplification } => format!(
            "peak amplification {peak_amplification:.4} below the u=1 threshold 3/sqrt(5)"
        ),
        InvalidReason::NonFinite => "non-finite event parameters".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnsembleSummary;

    #[test]
    fn bootstrap_table_handles_missing_parameters() {
        let boot = BootstrapReport {
            trials: 10,
            accepted: 8,
            rejected_degenerate: 2,
            invalid: 8,
            summary: EnsembleSummary {
                t0: None,
                u_min: None,
                tau: None,
            },
        };
        let text = format_bootstrap(&boot);
        assert!(text.contains("trials=10 accepted=8 degenerate=2 invalid=8"));
        assert_eq!(text.matches("(no valid estimates)").count(), 3);
    }

    #[test]
    fn invalid_reasons_are_readable() {
        let text = describe_invalid(&InvalidReason::BelowEventThreshold { peak_amplification: 1.2 });
        assert!(text.contains("1.2000"));
    }
}
