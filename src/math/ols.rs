//! Weighted least squares solver.
//!
//! For every fit (and every bootstrap trial) we solve a small linear regression
//! problem of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - f_i^T p)^2,   w_i = 1 / σ_i²
//! ```
//!
//! Implementation choices:
//! - We form the normal equations `(FᵀWF) p = FᵀWy` by scaling rows of `F` by
//!   `w_i` rather than materialising the `n × n` diagonal `W`.
//! - `(FᵀWF)` is inverted with an SVD pseudo-inverse, so rank-deficient inputs
//!   (e.g. a resample with few distinct times) still produce a finite answer
//!   instead of an error. The inverse doubles as the parameter covariance.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::FitError;

/// Relative cutoff for small singular values (matches the usual `rcond` default).
const PINV_RCOND: f64 = 1e-15;

/// Solution of a weighted least-squares problem.
#[derive(Debug, Clone)]
pub struct WeightedSolution {
    /// Best-fit parameters.
    pub params: DVector<f64>,
    /// `(FᵀWF)⁺`, the parameter covariance.
    pub covariance: DMatrix<f64>,
}

/// Moore–Penrose pseudo-inverse via SVD with a relative singular-value cutoff.
pub fn pseudo_inverse(m: &DMatrix<f64>) -> Result<DMatrix<f64>, FitError> {
    let svd = m.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let tol = if max_sv.is_finite() && max_sv > 0.0 {
        PINV_RCOND * max_sv
    } else {
        0.0
    };
    debug!(max_sv, tol, "pseudo-inverse");
    svd.pseudo_inverse(tol)
        .map_err(|e| FitError::PseudoInverse(e.to_string()))
}

/// Solve `min Σ w_i (y_i − F_i·p)²` through the pseudo-inverse of the normal matrix.
///
/// # Panics
/// Panics if `design.nrows()` differs from `y.len()` or `weights.len()`.
pub fn solve_weighted_least_squares(
    design: &DMatrix<f64>,
    y: &[f64],
    weights: &[f64],
) -> Result<WeightedSolution, FitError> {
    assert_eq!(design.nrows(), y.len());
    assert_eq!(design.nrows(), weights.len());

    // Rows of F scaled by w_i, i.e. W·F.
    let mut wf = design.clone();
    for (i, &w) in weights.iter().enumerate() {
        wf.row_mut(i).scale_mut(w);
    }

    let normal = design.transpose() * &wf;
    let rhs = wf.transpose() * DVector::from_column_slice(y);

    let covariance = pseudo_inverse(&normal)?;
    let params = &covariance * rhs;
    Ok(WeightedSolution { params, covariance })
}
