//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated light-curve samples (`LightCurveSample`, `MagnitudeSeries`)
//! - fit outputs (`ParabolicFitResult`, `PhysicalEstimate`, etc.)
//! - bootstrap outputs and run configuration

pub mod types;

pub use types::*;
