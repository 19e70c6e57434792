//! Peak isolation: slice the points around the brightest observation.
//!
//! The parabolic approximation only holds near the peak, so callers hand the
//! fitter a window of `before` points preceding and `after` points following
//! the peak index (inclusive of the peak, clamped to the array bounds).

use crate::domain::{LightCurveSample, PeakSense};
use crate::error::FitError;

/// Index of the peak according to `sense`. First occurrence wins on ties.
pub fn peak_index(y: &[f64], sense: PeakSense) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in y.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        let better = match (best, sense) {
            (None, _) => true,
            (Some((_, b)), PeakSense::Maximum) => v > b,
            (Some((_, b)), PeakSense::Minimum) => v < b,
        };
        if better {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Points `[peak − before, peak + after]` around the peak of `sample.y()`.
pub fn isolate_peak(
    sample: &LightCurveSample,
    before: usize,
    after: usize,
    sense: PeakSense,
) -> Result<LightCurveSample, FitError> {
    let peak = peak_index(sample.y(), sense).ok_or(FitError::EmptyWindow)?;
    let start = peak.saturating_sub(before);
    let end = peak.saturating_add(after).saturating_add(1).min(sample.len());
    Ok(sample.slice(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(y: Vec<f64>) -> LightCurveSample {
        let n = y.len();
        let t = (0..n).map(|i| i as f64).collect();
        LightCurveSample::new(t, y, vec![0.1; n]).unwrap()
    }

    #[test]
    fn peak_index_by_sense() {
        let y = [1.0, 3.0, 0.5, 3.0, 2.0];
        assert_eq!(peak_index(&y, PeakSense::Maximum), Some(1));
        assert_eq!(peak_index(&y, PeakSense::Minimum), Some(2));
        assert_eq!(peak_index(&[], PeakSense::Maximum), None);
    }

    #[test]
    fn window_is_inclusive_and_clamped() {
        let s = sample(vec![1.0, 1.1, 1.5, 2.4, 1.6, 1.2, 1.0]);
        let w = isolate_peak(&s, 1, 2, PeakSense::Maximum).unwrap();
        assert_eq!(w.t(), &[2.0, 3.0, 4.0, 5.0]);

        let w = isolate_peak(&s, 10, 10, PeakSense::Maximum).unwrap();
        assert_eq!(w.len(), 7);

        let w = isolate_peak(&s, 0, 0, PeakSense::Maximum).unwrap();
        assert_eq!(w.t(), &[3.0]);
    }

    #[test]
    fn magnitude_convention_uses_minimum() {
        let s = sample(vec![18.0, 17.5, 16.0, 17.4, 18.0]);
        let w = isolate_peak(&s, 1, 1, PeakSense::Minimum).unwrap();
        assert_eq!(w.y(), &[17.5, 16.0, 17.4]);
    }

    #[test]
    fn empty_sample_has_no_window() {
        let s = sample(vec![]);
        assert_eq!(isolate_peak(&s, 2, 2, PeakSense::Maximum).unwrap_err(), FitError::EmptyWindow);
    }
}
