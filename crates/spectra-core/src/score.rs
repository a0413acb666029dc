//! Candidate quality scoring.
//!
//! The score of a spectrum is built from the signal-to-uncertainty ratio
//! over the samples with positive signal:
//!
//! - `median`: median ratio
//! - `peak`: maximum ratio
//! - `combined`: `sqrt(median * peak)`
//!
//! Candidates are ranked by `combined`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use spectra_fits::FitsReader;

use crate::error::ScoreError;

/// Default extension holding the signal array.
pub const DEFAULT_SIGNAL_HDU: &str = "DATA";

/// Default extension holding the uncertainty array.
pub const DEFAULT_UNCERTAINTY_HDU: &str = "ERR";

/// Names of the two arrays read from each candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Signal array name.
    pub signal: String,
    /// Uncertainty array name.
    pub uncertainty: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            signal: DEFAULT_SIGNAL_HDU.to_string(),
            uncertainty: DEFAULT_UNCERTAINTY_HDU.to_string(),
        }
    }
}

/// Quality of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    /// Median signal-to-uncertainty ratio.
    pub median: f64,
    /// Peak signal-to-uncertainty ratio.
    pub peak: f64,
    /// Geometric mean of `median` and `peak`.
    pub combined: f64,
}

impl QualityScore {
    /// Combine a median and peak ratio.
    ///
    /// Fails when the product has no real square root or either input is NaN.
    pub fn new(median: f64, peak: f64) -> Result<Self, ScoreError> {
        let combined = (median * peak).sqrt();
        if combined.is_nan() {
            return Err(ScoreError::Undefined { median, peak });
        }
        Ok(Self {
            median,
            peak,
            combined,
        })
    }
}

/// Score a pair of arrays.
pub fn score_arrays(signal: &[f64], uncertainty: &[f64]) -> Result<QualityScore, ScoreError> {
    if signal.len() != uncertainty.len() {
        return Err(ScoreError::LengthMismatch {
            signal: signal.len(),
            uncertainty: uncertainty.len(),
        });
    }

    let mut ratios: Vec<f64> = signal
        .iter()
        .zip(uncertainty)
        .filter(|(s, _)| **s > 0.0)
        .map(|(s, u)| s / u)
        .collect();
    if ratios.is_empty() {
        return Err(ScoreError::NoPositiveSignal);
    }

    let (median, peak) = if ratios.iter().any(|r| r.is_nan()) {
        (f64::NAN, f64::NAN)
    } else {
        ratios.sort_by(f64::total_cmp);
        (median_of_sorted(&ratios), ratios[ratios.len() - 1])
    };
    QualityScore::new(median, peak)
}

/// Open a candidate file and score it.
///
/// The file is closed before this returns, whether or not scoring succeeds.
/// Both arrays must share their axes, not just their sample count.
pub fn score_file(path: &Path, config: &ScoringConfig) -> Result<QualityScore, ScoreError> {
    let (signal, uncertainty) = {
        let mut reader = FitsReader::open(path)?;
        let signal = reader.read_image(&config.signal)?;
        let uncertainty = reader.read_image(&config.uncertainty)?;
        (signal, uncertainty)
    };
    if signal.axes != uncertainty.axes {
        return Err(ScoreError::ShapeMismatch {
            signal: signal.axes,
            uncertainty: uncertainty.axes,
        });
    }
    score_arrays(&signal.values, &uncertainty.values)
}

/// Median of a non-empty sorted slice; even lengths average the middle pair.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
