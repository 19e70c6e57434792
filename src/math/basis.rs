//! Centered quadratic basis for the parabolic fit.
//!
//! Light-curve times are typically large absolute values (e.g. HJD − 2450000 ≈ 10⁴),
//! so a raw `[t², t, 1]` design matrix has columns differing by ~8 orders of
//! magnitude and the normal equations become ill-conditioned. We fit in the
//! centered variable `x = t − m` instead and map the coefficients back with a
//! fixed Jacobian:
//!
//! ```text
//! a·x² + b_c·x + c_c  with x = t − m
//!   = a·t² + (b_c − 2am)·t + (am² − b_c·m + c_c)
//! ```

use nalgebra::{DMatrix, Matrix3};

/// Arithmetic mean of `values` (`NaN` for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Design matrix `F = [x², x, 1]` with `x = t − center`, one row per point.
pub fn centered_design(t: &[f64], center: f64) -> DMatrix<f64> {
    DMatrix::from_fn(t.len(), 3, |i, j| {
        let x = t[i] - center;
        match j {
            0 => x * x,
            1 => x,
            _ => 1.0,
        }
    })
}

/// Jacobian mapping centered coefficients `(a, b_c, c_c)` to `(a, b, c)` in `t`.
pub fn uncentering_jacobian(center: f64) -> Matrix3<f64> {
    Matrix3::new(
        1.0, 0.0, 0.0, //
        -2.0 * center, 1.0, 0.0, //
        center * center, -center, 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn design_rows_are_centered_powers() {
        let f = centered_design(&[9.0, 10.0, 12.0], 10.0);
        assert_eq!(f.shape(), (3, 3));
        assert_eq!(f.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, -1.0, 1.0]);
        assert_eq!(f.row(1).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 1.0]);
        assert_eq!(f.row(2).iter().copied().collect::<Vec<_>>(), vec![4.0, 2.0, 1.0]);
    }

    #[test]
    fn jacobian_preserves_the_curve() {
        let m = 2456.5;
        let centered = Vector3::new(-0.3, 1.2, 4.0);
        let p = uncentering_jacobian(m) * centered;
        for &t in &[2450.0, 2456.5, 2460.25] {
            let x = t - m;
            let y_centered = centered[0] * x * x + centered[1] * x + centered[2];
            let y_raw = p[0] * t * t + p[1] * t + p[2];
            assert_relative_eq!(y_raw, y_centered, max_relative = 1e-9);
        }
    }

    #[test]
    fn mean_of_values() {
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }
}
