//! Bootstrap uncertainty estimation for the parabolic fit.
//!
//! Each trial draws `n` indices with replacement, refits the resample and
//! records `(t₀, u_min, τ)`. Trials are independent, so they run in parallel:
//!
//! - trials are split into fixed-size chunks
//! - each chunk owns an RNG seeded from `(seed, chunk index)`
//! - chunk buffers are concatenated in chunk order
//!
//! The output therefore depends only on the seed, never on the thread count.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{BootstrapConfig, BootstrapEnsemble, EnsembleSummary, LightCurveSample, PhysicalEstimate};
use crate::error::FitError;
use crate::fit::fitter::{fit_unchecked, validate_blending};
use crate::math::summarize;

/// A resample needs more distinct times than fitted coefficients.
const MIN_DISTINCT_TIMES: usize = 4;

/// Trials per RNG stream.
const CHUNK_TRIALS: usize = 256;

/// Counter-based RNG seed generation using SplitMix64.
///
/// Gives every chunk a well-separated stream from a single base seed.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Fill `out` with uniform indices in `0..n` (with replacement).
pub fn draw_indices<R: Rng>(n: usize, rng: &mut R, out: &mut Vec<usize>) {
    out.clear();
    out.extend((0..n).map(|_| rng.gen_range(0..n)));
}

/// Private per-chunk accumulator, merged after the parallel phase.
#[derive(Debug, Default)]
struct ChunkBuffer {
    t0: Vec<f64>,
    u_min: Vec<f64>,
    tau: Vec<f64>,
    accepted: usize,
    rejected_degenerate: usize,
    invalid: usize,
}

impl ChunkBuffer {
    fn record(&mut self, estimate: &PhysicalEstimate) {
        let PhysicalEstimate::Valid(p) = estimate else {
            self.invalid += 1;
            return;
        };
        // Each array is cleaned on its own.
        if p.t0.is_finite() {
            self.t0.push(p.t0);
        }
        if p.u_min.is_finite() {
            self.u_min.push(p.u_min);
        }
        if p.tau.is_finite() {
            self.tau.push(p.tau);
        }
    }
}

fn run_chunk(sample: &LightCurveSample, f_bl: f64, trials: usize, rng: &mut StdRng) -> ChunkBuffer {
    let n = sample.len();
    let mut buf = ChunkBuffer::default();
    let mut indices = Vec::with_capacity(n);

    for _ in 0..trials {
        draw_indices(n, rng, &mut indices);
        let resample = sample.resample(&indices);

        // An underdetermined resample would still yield numbers; they are noise.
        if resample.distinct_times() < MIN_DISTINCT_TIMES {
            buf.rejected_degenerate += 1;
            continue;
        }
        buf.accepted += 1;

        match fit_unchecked(&resample, f_bl) {
            Ok(fit) => buf.record(&fit.estimate),
            Err(err) => {
                debug!(%err, "bootstrap trial fit failed");
                buf.invalid += 1;
            }
        }
    }
    buf
}

/// Run `config.trials` resample-and-refit trials and collect the clean
/// parameter distributions.
///
/// Fails only on preconditions (`n ≤ 3`, bad `f_bl`, zero trials); individual
/// degenerate or unphysical trials are counted and skipped.
pub fn bootstrap(
    sample: &LightCurveSample,
    f_bl: f64,
    config: &BootstrapConfig,
) -> Result<BootstrapEnsemble, FitError> {
    validate_blending(f_bl)?;
    config.validate()?;
    if sample.len() < MIN_DISTINCT_TIMES {
        return Err(FitError::TooFewPoints { n: sample.len() });
    }

    let trials = config.trials;
    let n_chunks = trials.div_ceil(CHUNK_TRIALS);

    let chunks: Vec<ChunkBuffer> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_TRIALS;
            let len = CHUNK_TRIALS.min(trials - start);
            let mut rng = StdRng::seed_from_u64(counter_rng_seed(config.seed, chunk as u64));
            run_chunk(sample, f_bl, len, &mut rng)
        })
        .collect();

    let mut ensemble = BootstrapEnsemble {
        trials,
        ..BootstrapEnsemble::default()
    };
    for c in chunks {
        ensemble.t0.extend(c.t0);
        ensemble.u_min.extend(c.u_min);
        ensemble.tau.extend(c.tau);
        ensemble.accepted += c.accepted;
        ensemble.rejected_degenerate += c.rejected_degenerate;
        ensemble.invalid += c.invalid;
    }

    info!(
        trials,
        accepted = ensemble.accepted,
        rejected_degenerate = ensemble.rejected_degenerate,
        invalid = ensemble.invalid,
        "bootstrap finished"
    );
    if ensemble.t0.is_empty() || ensemble.u_min.is_empty() || ensemble.tau.is_empty() {
        warn!("bootstrap produced no valid estimates for at least one parameter");
    }

    Ok(ensemble)
}

impl BootstrapEnsemble {
    /// Mean, standard deviation and percentiles for each parameter.
    pub fn summary(&self) -> EnsembleSummary {
        EnsembleSummary {
            t0: summarize(&self.t0),
            u_min: summarize(&self.u_min),
            tau: summarize(&self.tau),
        }
    }
}
