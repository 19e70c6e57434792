//! Command-line parsing for the microlensing peak fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use clap::{Args, Parser, Subcommand};

use crate::domain::SimulationConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ulens", version, about = "Microlensing peak fitter (parabolic approximation + bootstrap)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate an event, fit a parabola to its peak and print the derived parameters.
    Fit(FitArgs),
    /// Same as `fit`, plus bootstrap uncertainty estimates for t0, u_min and tau.
    Bootstrap(BootstrapArgs),
}

/// Parameters of the simulated event and its photometry.
#[derive(Debug, Args, Clone)]
pub struct SimArgs {
    /// Time of closest approach (days).
    #[arg(long, default_value_t = 100.0)]
    pub t0: f64,

    /// Minimum impact parameter (Einstein radii).
    #[arg(long, default_value_t = 0.3)]
    pub u_min: f64,

    /// Einstein timescale (days).
    #[arg(long, default_value_t = 20.0)]
    pub tau: f64,

    /// Blending fraction in (0, 1]; also used when fitting.
    #[arg(long, default_value_t = 1.0)]
    pub f_bl: f64,

    /// First observation time (days).
    #[arg(long, default_value_t = 0.0)]
    pub t_start: f64,

    /// Last observation time (days).
    #[arg(long, default_value_t = 200.0)]
    pub t_end: f64,

    /// Number of observations.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub n_points: usize,

    /// Baseline (unlensed) magnitude.
    #[arg(long, default_value_t = 19.0)]
    pub baseline_mag: f64,

    /// Photometric noise (1 sigma, magnitudes).
    #[arg(long, default_value_t = 0.01)]
    pub mag_err: f64,

    /// Random seed for the simulated photometry.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl SimArgs {
    pub fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            t0: self.t0,
            u_min: self.u_min,
            tau: self.tau,
            f_bl: self.f_bl,
            t_start: self.t_start,
            t_end: self.t_end,
            n_points: self.n_points,
            baseline_mag: self.baseline_mag,
            mag_err: self.mag_err,
            seed: self.seed,
        }
    }
}

/// Options shared by `fit` and `bootstrap`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub sim: SimArgs,

    /// Points kept before the peak.
    #[arg(long, default_value_t = 15)]
    pub before: usize,

    /// Points kept after the peak.
    #[arg(long, default_value_t = 15)]
    pub after: usize,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Options for `bootstrap`.
#[derive(Debug, Args, Clone)]
pub struct BootstrapArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Number of resampling trials (default: $ULENS_BOOTSTRAP_TRIALS or 10000).
    #[arg(long)]
    pub trials: Option<usize>,

    /// Random seed for resampling.
    #[arg(long, default_value_t = 0)]
    pub boot_seed: u64,
}
