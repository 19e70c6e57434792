//! Peak fitting orchestration.
//!
//! Responsibilities:
//!
//! - isolate the points around the light-curve peak
//! - fit a weighted parabola and derive `(t₀, u_min, τ)`
//! - estimate parameter uncertainty by bootstrap resampling (parallel)

pub mod bootstrap;
pub mod fitter;
pub mod window;

pub use bootstrap::*;
pub use fitter::*;
pub use window::*;
