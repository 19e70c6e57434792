//! `microlens-peak` library crate.
//!
//! The binary (`ulens`) is a thin wrapper around this library so that:
//!
//! - the fitting and bootstrap engine is testable without spawning processes
//! - callers with their own photometry can use `fit` directly
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod report;
