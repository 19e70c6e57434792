//! Synthetic light-curve data.

pub mod sample;

pub use sample::*;
