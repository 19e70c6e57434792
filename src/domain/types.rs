//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and resampling
//! - printed as JSON by the `ulens` binary

use nalgebra::Matrix3;
use serde::Serialize;

use crate::error::FitError;

/// Number of bootstrap trials used when nothing else is configured.
pub const DEFAULT_BOOTSTRAP_TRIALS: usize = 10_000;

/// Environment variable overriding the bootstrap trial count.
pub const TRIALS_ENV_VAR: &str = "ULENS_BOOTSTRAP_TRIALS";

/// A photometric time series in intensity space.
///
/// The three sequences share indices and are validated on construction:
/// equal lengths, finite values, and strictly positive uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurveSample {
    t: Vec<f64>,
    y: Vec<f64>,
    y_err: Vec<f64>,
}

impl LightCurveSample {
    pub fn new(t: Vec<f64>, y: Vec<f64>, y_err: Vec<f64>) -> Result<Self, FitError> {
        if t.len() != y.len() || t.len() != y_err.len() {
            return Err(FitError::LengthMismatch {
                t: t.len(),
                y: y.len(),
                y_err: y_err.len(),
            });
        }
        for i in 0..t.len() {
            if !(t[i].is_finite() && y[i].is_finite()) {
                return Err(FitError::NonFiniteValue { index: i });
            }
            if !(y_err[i].is_finite() && y_err[i] > 0.0) {
                return Err(FitError::InvalidUncertainty {
                    index: i,
                    value: y_err[i],
                });
            }
        }
        Ok(Self { t, y, y_err })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn y_err(&self) -> &[f64] {
        &self.y_err
    }

    /// Build a new sample from the given indices (repeats allowed).
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn resample(&self, indices: &[usize]) -> Self {
        Self {
            t: indices.iter().map(|&i| self.t[i]).collect(),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            y_err: indices.iter().map(|&i| self.y_err[i]).collect(),
        }
    }

    /// Contiguous sub-range `[start, end)` of the sample.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            t: self.t[start..end].to_vec(),
            y: self.y[start..end].to_vec(),
            y_err: self.y_err[start..end].to_vec(),
        }
    }

    /// Number of distinct time values (exact comparison).
    pub fn distinct_times(&self) -> usize {
        distinct_count(&self.t)
    }
}

pub(crate) fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Raw photometry in magnitudes, as delivered by most survey pipelines.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSeries {
    pub t: Vec<f64>,
    pub mag: Vec<f64>,
    pub mag_err: Vec<f64>,
}

/// Which extremum of `y` marks the brightening peak.
///
/// Intensity and flux grow during an event, so the peak is a maximum. Magnitudes
/// shrink as the source brightens, so on magnitude arrays the peak is a minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakSense {
    #[default]
    Maximum,
    Minimum,
}

/// Quadratic `a·t² + b·t + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Parabola {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Parabola {
    pub fn eval(&self, t: f64) -> f64 {
        (self.a * t + self.b) * t + self.c
    }

    /// Abscissa of the vertex, `-b / 2a`; `None` for a degenerate (linear) fit.
    pub fn vertex(&self) -> Option<f64> {
        if self.a == 0.0 {
            return None;
        }
        let v = -self.b / (2.0 * self.a);
        v.is_finite().then_some(v)
    }

    pub fn coefficients(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }
}

/// Single-lens event parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MicrolensingParams {
    /// Time of closest approach.
    pub t0: f64,
    /// Minimum impact parameter (Einstein radii).
    pub u_min: f64,
    /// Einstein crossing timescale, same units as `t`.
    pub tau: f64,
}

/// Why a fitted parabola has no physical interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// `a >= 0`: the vertex is not a brightness maximum.
    OpensUpward,
    /// Peak amplification below the `u = 1` event threshold `3/√5`.
    BelowEventThreshold { peak_amplification: f64 },
    /// The derivation produced a non-finite value (e.g. `u_min` exactly 1).
    NonFinite,
}

/// Outcome of the physical validity gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum PhysicalEstimate {
    Valid(MicrolensingParams),
    Invalid(InvalidReason),
}

impl PhysicalEstimate {
    pub fn is_valid(&self) -> bool {
        matches!(self, PhysicalEstimate::Valid(_))
    }

    pub fn params(&self) -> Option<&MicrolensingParams> {
        match self {
            PhysicalEstimate::Valid(p) => Some(p),
            PhysicalEstimate::Invalid(_) => None,
        }
    }
}

/// Output of a single weighted parabolic fit.
#[derive(Debug, Clone, Serialize)]
pub struct ParabolicFitResult {
    /// Coefficients in the caller's time basis.
    pub parabola: Parabola,
    /// The same curve in `x = t − center`, as solved.
    pub centered: Parabola,
    /// Mean of the fitted times.
    pub center: f64,
    /// Covariance of `(a, b, c)` in the original time basis.
    #[serde(skip)]
    pub covariance: Matrix3<f64>,
    /// Marginal standard errors of `(a, b, c)`.
    pub std_errors: [f64; 3],
    pub chi2: f64,
    pub chi2_red: f64,
    pub p_value: f64,
    pub dof: usize,
    pub n_points: usize,
    pub estimate: PhysicalEstimate,
}

impl ParabolicFitResult {
    /// Evaluate the fitted curve at `t`.
    ///
    /// Uses the centered coefficients, which stay accurate for large `|t|`.
    pub fn predict(&self, t: f64) -> f64 {
        self.centered.eval(t - self.center)
    }
}

/// Bootstrap run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootstrapConfig {
    pub trials: usize,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_BOOTSTRAP_TRIALS,
            seed: 0,
        }
    }
}

impl BootstrapConfig {
    /// Defaults, with the trial count overridden by `ULENS_BOOTSTRAP_TRIALS` if set.
    pub fn from_env() -> Result<Self, FitError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(TRIALS_ENV_VAR) {
            config.trials = raw.trim().parse().map_err(|_| {
                FitError::InvalidConfig(format!("{TRIALS_ENV_VAR}={raw:?} is not a trial count."))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.trials == 0 {
            return Err(FitError::InvalidConfig("Bootstrap trials must be > 0.".into()));
        }
        Ok(())
    }
}

/// Empirical parameter distributions from bootstrap resampling.
///
/// Only valid trials contribute, and each contributes to all three arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BootstrapEnsemble {
    pub t0: Vec<f64>,
    pub u_min: Vec<f64>,
    pub tau: Vec<f64>,
    /// Trials attempted.
    pub trials: usize,
    /// Trials with enough distinct times to be fitted.
    pub accepted: usize,
    /// Trials dropped for having ≤ 3 distinct times.
    pub rejected_degenerate: usize,
    /// Accepted trials whose fit failed the validity gate.
    pub invalid: usize,
}

/// Summary statistics of one bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub p16: f64,
    pub median: f64,
    pub p84: f64,
}

/// Per-parameter summaries of a [`BootstrapEnsemble`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub t0: Option<ParameterSummary>,
    pub u_min: Option<ParameterSummary>,
    pub tau: Option<ParameterSummary>,
}

/// Parameters for a simulated single-lens event observed in magnitudes.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfig {
    pub t0: f64,
    pub u_min: f64,
    pub tau: f64,
    pub f_bl: f64,
    pub t_start: f64,
    pub t_end: f64,
    pub n_points: usize,
    pub baseline_mag: f64,
    /// Gaussian magnitude noise (1σ), also reported as the per-point error.
    pub mag_err: f64,
    pub seed: u64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    /// Points kept before the peak index.
    pub window_before: usize,
    /// Points kept after the peak index.
    pub window_after: usize,
    /// Bootstrap settings; `None` for a single fit.
    pub bootstrap: Option<BootstrapConfig>,
    pub json: bool,
}
