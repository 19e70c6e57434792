//! Goodness-of-fit and summary statistics.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::domain::ParameterSummary;

/// Chi-square survival function `P(X² ≥ chi2)` with `dof` degrees of freedom.
///
/// Returns `NaN` when `dof == 0` or `chi2` is not finite.
pub fn chi2_survival(chi2: f64, dof: usize) -> f64 {
    if dof == 0 || !chi2.is_finite() {
        return f64::NAN;
    }
    match ChiSquared::new(dof as f64) {
        Ok(dist) => dist.sf(chi2.max(0.0)),
        Err(_) => f64::NAN,
    }
}

/// Quantile for sorted data via linear interpolation.
///
/// - `q=0` returns min
/// - `q=1` returns max
/// - empty input returns `NaN`
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Mean, population standard deviation and 16/50/84 percentiles.
///
/// Returns `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<ParameterSummary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(ParameterSummary {
        count: values.len(),
        mean,
        std_dev: var.sqrt(),
        p16: quantile_linear_sorted(&sorted, 0.16),
        median: quantile_linear_sorted(&sorted, 0.5),
        p84: quantile_linear_sorted(&sorted, 0.84),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn survival_at_zero_is_one() {
        assert_relative_eq!(chi2_survival(0.0, 5), 1.0, epsilon = 1e-12);
        assert!(chi2_survival(1.0, 0).is_nan());
    }

    #[test]
    fn survival_matches_known_values() {
        // dof = 2 is exponential: sf(x) = exp(-x/2)
        assert_relative_eq!(chi2_survival(3.0, 2), (-1.5f64).exp(), epsilon = 1e-10);
        // median of chi2(1) ≈ 0.454936
        assert_relative_eq!(chi2_survival(0.454_936_423_119_572_8, 1), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(quantile_linear_sorted(&sorted, 0.0), 1.0);
        assert_relative_eq!(quantile_linear_sorted(&sorted, 0.5), 3.0);
        assert_relative_eq!(quantile_linear_sorted(&sorted, 0.625), 3.5);
        assert_relative_eq!(quantile_linear_sorted(&sorted, 1.0), 5.0);
        assert!(quantile_linear_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn summarize_uses_population_std() {
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std_dev, 2.0);
        assert_relative_eq!(s.median, 4.5);
        assert!(summarize(&[]).is_none());
    }
}
