//! Score and overlap thresholding utilities.

use crate::error::{RoiEvalError, Result};
use crate::types::LabeledRegion;
use serde::{Deserialize, Serialize};

/// Mark which regions survive a confidence threshold.
///
/// A region survives when its score is strictly greater than `threshold` or
/// when it has no score. Regions are flagged in place rather than removed, so
/// indices keep referring to the original list.
///
/// # Example
///
/// ```
/// use roi_eval::threshold::confidence_mask;
/// use roi_eval::types::{LabeledRegion, Rect};
///
/// let regions = vec![
///     LabeledRegion::new(Rect::new(10.0, 20.0, 30.0, 40.0)).with_score(0.9),
///     LabeledRegion::new(Rect::new(50.0, 60.0, 70.0, 80.0)).with_score(0.3),
/// ];
///
/// assert_eq!(confidence_mask(&regions, Some(0.5)), vec![true, false]);
/// assert_eq!(confidence_mask(&regions, None), vec![true, true]);
/// ```
pub fn confidence_mask(regions: &[LabeledRegion], threshold: Option<f64>) -> Vec<bool> {
    regions
        .iter()
        .map(|r| r.passes_score_threshold(threshold))
        .collect()
}

/// Inclusive, evenly spaced threshold range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

impl ThresholdRange {
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        Self { start, end, steps }
    }

    /// Expand the range into its threshold values.
    pub fn values(&self) -> Result<Vec<f64>> {
        generate_threshold_range(self.start, self.end, self.steps)
    }
}

/// Generate a range of threshold values for evaluation.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Example
///
/// ```
/// use roi_eval::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.0, 1.0, 21).unwrap();
/// assert_eq!(thresholds.len(), 21);
/// assert_eq!(thresholds[0], 0.0);
/// assert_eq!(thresholds[20], 1.0);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(RoiEvalError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string(),
        ));
    }

    validate_score_threshold(start)?;
    validate_score_threshold(end)?;

    if start > end {
        return Err(RoiEvalError::InvalidThreshold(format!(
            "Start threshold ({}) must be <= end threshold ({})",
            start, end
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| if i == steps - 1 { end } else { start + step_size * i as f64 })
        .collect())
}

/// Validate that an overlap threshold is in the valid range [0.0, 1.0].
pub fn validate_overlap_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(RoiEvalError::InvalidThreshold(format!(
            "Overlap threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

/// Validate a confidence threshold.
///
/// Detector scores are not necessarily probabilities, so any finite value is accepted.
pub fn validate_score_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() {
        return Err(RoiEvalError::InvalidThreshold(format!(
            "Score threshold must be finite, got {}",
            threshold
        )));
    }
    Ok(())
}
