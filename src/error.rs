use thiserror::Error;

/// Precondition and numerical failures raised by the fitting library.
///
/// A fit that fails the physical validity gate is *not* an error; it is
/// reported as [`crate::domain::PhysicalEstimate::Invalid`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Sequence lengths differ: t={t}, y={y}, y_err={y_err}.")]
    LengthMismatch { t: usize, y: usize, y_err: usize },

    #[error("A parabolic fit needs more than 3 points (got {n}).")]
    TooFewPoints { n: usize },

    #[error("Uncertainty at index {index} must be finite and > 0 (got {value}).")]
    InvalidUncertainty { index: usize, value: f64 },

    #[error("Non-finite time or intensity at index {index}.")]
    NonFiniteValue { index: usize },

    #[error("Blending fraction must lie in (0, 1] (got {0}).")]
    InvalidBlending(f64),

    #[error("Peak window is empty.")]
    EmptyWindow,

    #[error("Pseudo-inverse failed: {0}")]
    PseudoInverse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FitError {
    /// Exit code used by the `ulens` binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::PseudoInverse(_) => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
