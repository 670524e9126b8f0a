//! Begin-of-degradation and end-of-life markers.
//!
//! The engine reports both as time estimates in the last row of the `BD` and
//! `EOL` columns. Each estimate is mapped to the row of `DT` nearest to it;
//! ties go to the earlier row, so an exact match always resolves to its first
//! occurrence.

use arule_core::{Tolerances, nearly_equal};
use serde::Serialize;

use crate::types::RunOutputRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerMatch {
    /// Row index into the output columns.
    pub index: usize,
    /// Estimated time reported by the engine.
    pub estimate: f64,
    /// `DT` value at `index`.
    pub time: f64,
    /// Whether `time` equals `estimate` within default tolerances.
    pub exact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DegradationMarkers {
    pub begin: MarkerMatch,
    pub end: MarkerMatch,
}

impl DegradationMarkers {
    /// `(begin, end)` row indices.
    pub fn indices(&self) -> (usize, usize) {
        (self.begin.index, self.end.index)
    }
}

/// Index of the finite entry of `times` closest to `target`, earliest on ties.
/// `None` if `target` is not finite or no finite time exists.
pub fn nearest_time_index(times: &[f64], target: f64) -> Option<usize> {
    if !target.is_finite() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, &time) in times.iter().enumerate() {
        if !time.is_finite() {
            continue;
        }
        let diff = (time - target).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((idx, diff)),
        }
    }
    best.map(|(idx, _)| idx)
}

fn match_estimate(times: &[f64], estimates: &[f64]) -> Option<MarkerMatch> {
    let estimate = *estimates.last()?;
    let index = nearest_time_index(times, estimate)?;
    let time = times[index];
    Some(MarkerMatch {
        index,
        estimate,
        time,
        exact: nearly_equal(time, estimate, Tolerances::default()),
    })
}

/// Locate the BD and EOL rows. `None` when there are no rows or the engine
/// left either estimate empty.
pub fn locate_degradation_markers(record: &RunOutputRecord) -> Option<DegradationMarkers> {
    let begin = match_estimate(&record.dt, &record.bd)?;
    let end = match_estimate(&record.dt, &record.eol)?;
    Some(DegradationMarkers { begin, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dt: Vec<f64>, bd_last: f64, eol_last: f64) -> RunOutputRecord {
        let n = dt.len();
        let mut bd = vec![0.0; n];
        let mut eol = vec![0.0; n];
        if let Some(last) = bd.last_mut() {
            *last = bd_last;
        }
        if let Some(last) = eol.last_mut() {
            *last = eol_last;
        }
        RunOutputRecord {
            dt,
            bd,
            eol,
            ..Default::default()
        }
    }

    #[test]
    fn exact_estimates_map_to_their_rows() {
        let markers =
            locate_degradation_markers(&record(vec![0.0, 1.0, 2.0, 3.0, 4.0], 2.0, 4.0)).unwrap();
        assert_eq!(markers.indices(), (2, 4));
        assert!(markers.begin.exact);
        assert!(markers.end.exact);
    }

    #[test]
    fn halfway_estimate_resolves_to_earlier_row() {
        let markers =
            locate_degradation_markers(&record(vec![0.0, 1.0, 2.0, 3.0, 4.0], 2.0, 3.5)).unwrap();
        assert_eq!(markers.indices(), (2, 3));
        assert!(!markers.end.exact);
        assert_eq!(markers.end.time, 3.0);
        assert_eq!(markers.end.estimate, 3.5);
    }

    #[test]
    fn estimate_beyond_last_sample_clamps_to_last_row() {
        let markers =
            locate_degradation_markers(&record(vec![0.0, 10.0, 20.0], 0.0, 95.0)).unwrap();
        assert_eq!(markers.indices(), (0, 2));
    }

    #[test]
    fn repeated_time_uses_first_occurrence() {
        assert_eq!(nearest_time_index(&[0.0, 1.0, 1.0, 2.0], 1.0), Some(1));
    }

    #[test]
    fn nan_times_are_skipped() {
        assert_eq!(nearest_time_index(&[f64::NAN, 5.0, 7.0], 0.0), Some(1));
        assert_eq!(nearest_time_index(&[f64::NAN], 0.0), None);
    }

    #[test]
    fn missing_estimate_gives_none() {
        assert!(locate_degradation_markers(&record(vec![0.0, 1.0], f64::NAN, 1.0)).is_none());
        assert!(locate_degradation_markers(&RunOutputRecord::default()).is_none());
    }
}
